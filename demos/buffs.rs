//! Buffs example: config seeding, sources and timed modifiers
//!
//! This example demonstrates:
//! - Loading a catalog and a config from JSON
//! - Level-up upgrades tagged with a source
//! - A timed buff driven by a game loop

use std::time::Duration;
use zzattr::*;

const CATALOG: &str = r#"{
    "stats": [
        { "key": "MaxHP", "default_base_value": 100,
          "default_upgrade": { "kind": "Flat", "value": 15 } },
        { "key": "MoveSpeed", "default_base_value": 5,
          "default_upgrade": { "kind": "PercentAdd", "value": 0.05 } },
        { "key": "CritChance", "default_base_value": 0.05,
          "clamp": true, "min_value": 0, "max_value": 1 }
    ]
}"#;

const PLAYER: &str = r#"{
    "entries": [
        { "stat": "MaxHP", "base_value": 120 },
        { "stat": "MoveSpeed" },
        { "stat": "CritChance" }
    ]
}"#;

fn main() -> Result<(), StatError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let catalog = StatCatalog::from_json(CATALOG)?;
    let config = StatsConfig::from_json(PLAYER, &catalog)?;
    let speed = catalog
        .get("MoveSpeed")
        .cloned()
        .ok_or_else(|| StatError::UnknownStat(StatId::from_str("MoveSpeed")))?;

    let mut player = StatsContainer::new();
    player.apply_config(&config);

    println!("=== Spawned ===");
    for definition in catalog.iter() {
        println!("  {}: {:.2}", definition.key(), player.get_value(definition, 0.0));
    }

    let level_up = EffectSource::new("level-up");
    for level in 2..=3 {
        player.apply_default_upgrades(&config, &level_up);
        println!("\n=== Level {} ===", level);
        for definition in catalog.iter() {
            println!("  {}: {:.2}", definition.key(), player.get_value(definition, 0.0));
        }
    }

    let mut sprint = ModifierApplier::new(
        "sprint",
        vec![ApplierEntry::new(speed.clone(), ModifierKind::Mult, 0.5)
            .lasting(Duration::from_millis(1500))],
    );
    sprint.enable(&mut player);
    println!("\n=== Sprinting ===");

    let frame = Duration::from_millis(500);
    for tick in 1..=4 {
        sprint.tick(&mut player, frame);
        println!(
            "  t={}ms MoveSpeed = {:.2}",
            tick * frame.as_millis(),
            player.get_value(&speed, 0.0)
        );
    }

    println!("\nRespec: removing every level-up bonus");
    let removed = player.remove_all_from_source(&level_up);
    println!("  removed {} modifiers, MoveSpeed = {:.2}", removed, player.get_value(&speed, 0.0));

    Ok(())
}

//! Computed stats example: derived attributes that follow their inputs
//!
//! This example demonstrates:
//! - Registering computed stats with dependencies
//! - Automatic refresh when a dependency changes
//! - Change notifications
//! - Cycle rejection

use zzattr::*;

fn main() -> Result<(), StatError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let strength = StatDefinition::new("Strength", 10.0);
    let vitality = StatDefinition::new("Vitality", 8.0);
    let max_hp = StatDefinition::new("MaxHP", 0.0);
    let carry = StatDefinition::new("CarryWeight", 0.0);

    let mut stats = StatsContainer::new();
    stats.subscribe(|event| {
        println!("  [event] {} -> {:.1}", event.definition.key(), event.value);
    });

    println!("Registering MaxHP = 50 + Vitality * 10 + Strength * 2");
    let (v, s) = (vitality.clone(), strength.clone());
    stats.register_computed(
        &max_hp,
        move |stats| 50.0 + stats.get_value(&v, 0.0) * 10.0 + stats.get_value(&s, 0.0) * 2.0,
        [&vitality, &strength],
    )?;

    println!("Registering CarryWeight = MaxHP / 4");
    let hp = max_hp.clone();
    stats.register_computed(&carry, move |stats| stats.get_value(&hp, 0.0) / 4.0, [&max_hp])?;

    println!("\nMaxHP = {:.1}, CarryWeight = {:.1}", stats.get_value(&max_hp, 0.0), stats.get_value(&carry, 0.0));

    println!("\nRaising Vitality to 12:");
    stats.set_base_value(&vitality, 12.0);
    println!("MaxHP = {:.1}, CarryWeight = {:.1}", stats.get_value(&max_hp, 0.0), stats.get_value(&carry, 0.0));

    println!("\nTrying to make Vitality depend on CarryWeight...");
    let c = carry.clone();
    match stats.register_computed(&vitality, move |stats| stats.get_value(&c, 0.0), [&carry]) {
        Ok(()) => println!("Registered (unexpected)"),
        Err(err) => println!("Rejected: {}", err),
    }

    Ok(())
}

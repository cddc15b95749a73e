//! Basic example: modifiers, handles and the evaluation order
//!
//! This example demonstrates:
//! - Adding flat, additive percent and multiplicative modifiers
//! - Removing one modifier by handle
//! - Inspecting the evaluation breakdown

use zzattr::*;

fn main() -> Result<(), StatError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let damage = StatDefinition::new("Damage", 100.0);
    let mut stats = StatsContainer::new();

    println!("Adding modifiers to Damage (base 100):");
    let sword = stats.add_modifier(&damage, StatModifier::flat(10.0));
    println!("  - Sword: +10 flat ({})", sword);
    stats.add_modifier(&damage, StatModifier::flat(5.0));
    println!("  - Ring: +5 flat");
    stats.add_modifier(&damage, StatModifier::percent_add(0.10));
    stats.add_modifier(&damage, StatModifier::percent_add(0.05));
    println!("  - Talents: +10% and +5% (additive)");
    stats.add_modifier(&damage, StatModifier::mult(0.20));
    println!("  - Rage: x1.20");

    println!("\nDamage = {:.2}", stats.get_value(&damage, 0.0));
    println!("Calculation: (100 + 10 + 5) * (1 + 0.10 + 0.05) * 1.20 = 158.70");

    if let Some(breakdown) = stats.breakdown(&damage) {
        println!("\n=== Breakdown ===");
        println!("Base:            {:.2}", breakdown.base_value);
        println!("After flat:      {:.2} (+{:.2})", breakdown.after_flat, breakdown.flat_sum);
        println!(
            "After percent:   {:.2} (+{:.0}%)",
            breakdown.after_percent_add,
            breakdown.percent_add_sum * 100.0
        );
        println!("After mult:      {:.2} ({:?})", breakdown.after_mult, breakdown.multipliers);
        println!("Final:           {:.2}", breakdown.value);
    }

    println!("\nUnequipping the sword...");
    stats.remove_modifier(&damage, sword);
    println!("Damage = {:.2}", stats.get_value(&damage, 0.0));

    Ok(())
}

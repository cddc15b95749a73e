use std::sync::{Arc, Mutex};
use std::time::Duration;
use zzattr::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Modifiers of every kind combine in the documented order.
#[test]
fn test_order_of_operations() {
    let damage = StatDefinition::new("Damage", 100.0);
    let mut stats = StatsContainer::new();

    stats.add_modifier(&damage, StatModifier::mult(0.20));
    stats.add_modifier(&damage, StatModifier::percent_add(0.05));
    stats.add_modifier(&damage, StatModifier::flat(10.0));
    stats.add_modifier(&damage, StatModifier::percent_add(0.10));
    stats.add_modifier(&damage, StatModifier::flat(5.0));

    let value = stats.get_value(&damage, 0.0);
    assert!(approx(value, 158.7), "got {}", value);
}

/// The same inputs on a clamped definition hit the max exactly.
#[test]
fn test_clamping() {
    let damage = StatDefinition::new("Damage", 100.0).with_clamp(0.0, 50.0);
    let mut stats = StatsContainer::new();

    stats.add_modifier(&damage, StatModifier::flat(10.0));
    stats.add_modifier(&damage, StatModifier::flat(5.0));
    stats.add_modifier(&damage, StatModifier::percent_add(0.10));
    stats.add_modifier(&damage, StatModifier::percent_add(0.05));
    stats.add_modifier(&damage, StatModifier::mult(0.20));

    assert_eq!(stats.get_value(&damage, 0.0), 50.0);
}

#[test]
fn test_handle_stability() {
    let armor = StatDefinition::new("Armor", 10.0);
    let mut stats = StatsContainer::new();

    let helmet = stats.add_modifier(&armor, StatModifier::flat(3.0));
    let boots = stats.add_modifier(&armor, StatModifier::flat(2.0));
    assert_ne!(helmet, boots);
    assert!(helmet.is_valid() && boots.is_valid());

    assert!(stats.remove_modifier(&armor, helmet));
    assert_eq!(stats.get_value(&armor, 0.0), 12.0);

    // Stale and invalid handles are rejected without side effects.
    assert!(!stats.remove_modifier(&armor, helmet));
    assert!(!stats.remove_modifier(&armor, ModifierHandle::default()));
    assert_eq!(stats.get_value(&armor, 0.0), 12.0);
}

#[test]
fn test_bulk_removal_by_source() {
    let speed = StatDefinition::new("Speed", 8.0);
    let mut stats = StatsContainer::new();
    let before = stats.get_value(&speed, 0.0);

    let boots = EffectSource::new("boots");
    stats.add_modifier(&speed, StatModifier::flat(2.0).with_source(&boots));
    stats.add_modifier(&speed, StatModifier::percent_add(0.25).with_source(&boots));
    stats.add_modifier(&speed, StatModifier::mult(0.1).with_source(&boots));
    assert!(stats.get_value(&speed, 0.0) > before);

    assert_eq!(stats.remove_all_from_source(&boots), 3);
    assert_eq!(stats.get_value(&speed, 0.0), before);
}

/// Sources compare by identity, so an equal-looking source removes nothing.
#[test]
fn test_source_identity() {
    let hp = StatDefinition::new("HP", 50.0);
    let mut stats = StatsContainer::new();

    let ring = EffectSource::new("ring");
    let lookalike = EffectSource::new("ring");
    stats.add_modifier(&hp, StatModifier::flat(10.0).with_source(&ring));

    assert_eq!(stats.remove_all_from_source(&lookalike), 0);
    assert_eq!(stats.remove_all_from_source(ring.key()), 1);
}

#[test]
fn test_computed_propagation() {
    let a = StatDefinition::new("A", 0.0);
    let b = StatDefinition::new("B", 0.0);
    let c = StatDefinition::new("C", 0.0);
    let mut stats = StatsContainer::new();

    let (da, db) = (a.clone(), b.clone());
    stats
        .register_computed(
            &c,
            move |s| s.get_value(&da, 0.0) + s.get_value(&db, 0.0),
            [&a, &b],
        )
        .unwrap();

    stats.set_base_value(&a, 10.0);
    stats.set_base_value(&b, 20.0);
    assert_eq!(stats.get_value(&c, 0.0), 30.0);

    stats.set_base_value(&a, 15.0);
    assert_eq!(stats.get_value(&c, 0.0), 35.0);
}

#[test]
fn test_self_cycle_guard() {
    let stamina = StatDefinition::new("Stamina", 10.0);
    let mut stats = StatsContainer::new();

    let own = stamina.clone();
    stats
        .register_computed(&stamina, move |s| s.get_value(&own, 0.0) * 2.0, [&stamina])
        .unwrap();
    assert_eq!(stats.get_value(&stamina, 0.0), 20.0);

    // Changing the stat never re-triggers its own formula.
    stats.add_modifier(&stamina, StatModifier::flat(5.0));
    assert_eq!(stats.get_value(&stamina, 0.0), 25.0);
    assert_eq!(stats.base_value(&stamina), Some(20.0));
}

#[test]
fn test_two_stat_cycle_is_an_error() {
    let x = StatDefinition::new("X", 1.0);
    let y = StatDefinition::new("Y", 1.0);
    let mut stats = StatsContainer::new();

    let dx = x.clone();
    stats
        .register_computed(&y, move |s| s.get_value(&dx, 0.0), [&x])
        .unwrap();

    let dy = y.clone();
    let err = stats
        .register_computed(&x, move |s| s.get_value(&dy, 0.0), [&y])
        .unwrap_err();
    let StatError::Cycle { path } = err else {
        panic!("expected a cycle error");
    };
    assert_eq!(path.first(), path.last());
    assert!(path.contains(x.key()) && path.contains(y.key()));
}

#[test]
fn test_fallback_on_invalid_key() {
    let blank = StatDefinition::new("", 3.0);
    let mut stats = StatsContainer::new();

    assert_eq!(stats.get_value(None::<&StatDefinition>, 42.0), 42.0);
    assert_eq!(stats.get_value(&blank, 7.0), 7.0);
}

#[test]
fn test_idempotent_base_write_does_not_notify() {
    let hp = StatDefinition::new("HP", 100.0);
    let mut stats = StatsContainer::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    stats.subscribe(move |event| sink.lock().unwrap().push(event.value));

    stats.set_base_value(&hp, 100.0);
    stats.set_base_value(&hp, 100.0 + 1e-9);
    assert!(events.lock().unwrap().is_empty());
    assert_eq!(stats.get_value(&hp, 0.0), 100.0);
}

#[test]
fn test_config_seeding_and_level_up() {
    let catalog = StatCatalog::from_json(
        r#"{
            "stats": [
                { "key": "MaxHP", "default_base_value": 100,
                  "default_upgrade": { "kind": "Flat", "value": 10 } },
                { "key": "Damage", "default_base_value": 5,
                  "default_upgrade": { "kind": "PercentAdd", "value": 0.1 } },
                { "key": "Speed", "default_base_value": 3 }
            ]
        }"#,
    )
    .unwrap();
    let config = StatsConfig::from_json(
        r#"{ "entries": [
            { "stat": "MaxHP", "base_value": 120 },
            { "stat": "Damage" },
            { "stat": "Speed" }
        ] }"#,
        &catalog,
    )
    .unwrap();

    let max_hp = catalog.get("MaxHP").unwrap().clone();
    let damage = catalog.get("Damage").unwrap().clone();
    let speed = catalog.get("Speed").unwrap().clone();

    let mut stats = StatsContainer::new();
    stats.apply_config(&config);
    assert_eq!(stats.get_value(&max_hp, 0.0), 120.0);
    assert_eq!(stats.get_value(&damage, 0.0), 5.0);

    let level_up = EffectSource::new("level-up");
    let handles = stats.apply_default_upgrades(&config, &level_up);
    assert_eq!(handles.len(), 2);
    stats.apply_default_upgrades(&config, &level_up);

    assert_eq!(stats.get_value(&max_hp, 0.0), 140.0);
    assert!(approx(stats.get_value(&damage, 0.0), 6.0));
    assert_eq!(stats.get_value(&speed, 0.0), 3.0);

    assert_eq!(stats.remove_all_from_source(&level_up), 4);
    assert_eq!(stats.get_value(&max_hp, 0.0), 120.0);
}

#[test]
fn test_computed_stat_follows_timed_buff() {
    let agility = StatDefinition::new("Agility", 10.0);
    let dodge = StatDefinition::new("Dodge", 0.0).with_clamp(0.0, 0.75);
    let mut stats = StatsContainer::new();

    let source = agility.clone();
    stats
        .register_computed(&dodge, move |s| s.get_value(&source, 0.0) * 0.02, [&agility])
        .unwrap();
    assert!(approx(stats.get_value(&dodge, 0.0), 0.2));

    let mut elixir = ModifierApplier::new(
        "elixir",
        vec![ApplierEntry::new(agility.clone(), ModifierKind::Flat, 40.0)
            .lasting(Duration::from_secs(10))],
    );
    elixir.enable(&mut stats);
    assert!(approx(stats.get_value(&dodge, 0.0), 1.0_f64.min(0.75)));

    elixir.tick(&mut stats, Duration::from_secs(10));
    assert!(approx(stats.get_value(&dodge, 0.0), 0.2));
}

#[test]
fn test_change_events_carry_definition() {
    let shield = StatDefinition::new("Shield", 0.0);
    let mut stats = StatsContainer::new();
    let events: Arc<Mutex<Vec<StatChanged>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let id = stats.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    stats.add_modifier(&shield, StatModifier::flat(25.0));
    stats.unsubscribe(id);
    stats.add_modifier(&shield, StatModifier::flat(25.0));

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].definition, shield);
    assert_eq!(events[0].value, 25.0);
}

#[test]
fn test_containers_are_independent_and_send() {
    fn assert_send<T: Send>() {}
    assert_send::<StatsContainer>();

    let hp = StatDefinition::new("HP", 100.0);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let hp = hp.clone();
            std::thread::spawn(move || {
                let mut stats = StatsContainer::new();
                stats.add_modifier(&hp, StatModifier::flat(i as f64));
                stats.get_value(&hp, 0.0)
            })
        })
        .collect();

    let values: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(values, vec![100.0, 101.0, 102.0, 103.0]);
}

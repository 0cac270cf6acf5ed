//! End-to-end resolution flows against an in-memory roster.

use std::sync::Arc;

use lc_core::{
    Actor, ActorId, ActorKind, CoreSystem, Damage, DamageType, Item, ItemData, ItemId,
    MechWeapon, MechWeaponProfile, NpcFeature, Roster, TagInstance, tag,
};
use lc_mechanics::card::ChatCard;
use lc_mechanics::host::RecordingNotifier;
use lc_mechanics::{
    AutomationSettings, CancelPrompt, EngineConfig, FixedDice, LocalRoller, MacroContext,
    MacroDescriptor, MacroFn, MemoryChat, MemoryStore, NotifyLevel, PresetPrompt, Resolver,
};
use serde_json::json;

struct Scene {
    store: Arc<MemoryStore>,
    chat: Arc<MemoryChat>,
    notifier: Arc<RecordingNotifier>,
    mech: ActorId,
    rifle: ItemId,
    npc: ActorId,
}

fn rifle(tags: Vec<TagInstance>) -> Item {
    Item::new(
        "Rifle",
        ItemData::MechWeapon(MechWeapon::with_profile(MechWeaponProfile {
            name: "Standard".into(),
            damage: vec![Damage::new("1d6", DamageType::Kinetic)],
            tags,
            effect: String::new(),
            on_hit: String::new(),
        })),
    )
}

fn scene(weapon: Item) -> Scene {
    let mut roster = Roster::new();

    let mut pilot = Actor::new(ActorKind::Pilot, "Ace");
    pilot.stats.grit = 2;
    let pilot_id = roster.add_actor(pilot).unwrap();

    let mut mech = Actor::mech("Everest");
    mech.pilot = Some(pilot_id);
    mech.stats.hull = 2;
    mech.stats.tech_attack = 1;
    mech.core_system = Some(CoreSystem {
        active_name: "Hyperspec Fuel Injector".into(),
        active_effect: "Gain +1 accuracy".into(),
        tags: Vec::new(),
    });
    let rifle = weapon.id;
    mech.items.push(weapon);
    let mech_id = roster.add_actor(mech).unwrap();

    let mut npc = Actor::new(ActorKind::Npc, "Assault");
    npc.stats.evasion = 10;
    npc.stats.e_defense = 8;
    npc.stats.tier = 1;
    npc.statuses.lock_on = true;
    let npc_id = roster.add_actor(npc).unwrap();

    Scene {
        store: Arc::new(MemoryStore::new(roster)),
        chat: Arc::new(MemoryChat::new()),
        notifier: Arc::new(RecordingNotifier::new()),
        mech: mech_id,
        rifle,
        npc: npc_id,
    }
}

fn resolver(scene: &Scene, config: EngineConfig, faces: Vec<u32>) -> Resolver {
    Resolver::new(scene.store.clone(), config)
        .with_dice(Arc::new(LocalRoller::new(FixedDice::new(faces))))
        .with_chat(scene.chat.clone())
        .with_notifier(scene.notifier.clone())
}

fn weapon_loaded(roster: &Roster, mech: ActorId, item: ItemId) -> bool {
    match &roster.get(mech).unwrap().item(item).unwrap().data {
        ItemData::MechWeapon(w) => w.loaded,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn weapon_attack_hits_and_writes_back_once() {
    let s = scene(rifle(vec![
        TagInstance::new(tag::LOADING),
        TagInstance::with_value(tag::HEAT_SELF, 2),
    ]));
    let resolver = resolver(&s, EngineConfig::default(), vec![12, 3, 5]);
    let ctx = MacroContext::new(s.mech).with_targets(vec![s.npc]);

    let card = resolver
        .prepare_attack(&ctx, s.rifle, Default::default())
        .await
        .unwrap();
    let ChatCard::Attack(card) = card else {
        panic!("expected an attack card");
    };

    assert_eq!(card.attacks[0].roll.formula, "1d20 + 2 + 1d6");
    assert_eq!(card.attacks[0].roll.total, 17);
    assert_eq!(card.hits.len(), 1);
    assert!(card.hits[0].hit);
    assert!(!card.hits[0].crit);
    assert_eq!(card.hits[0].total, "17");
    assert_eq!(card.defense, "EVASION");
    assert_eq!(card.damages[0].roll.total, 5);
    assert!(card.crit_damages.is_empty());
    assert_eq!(card.self_heat, 2);

    let roster = s.store.snapshot().await;
    assert_eq!(roster.get(s.mech).unwrap().current_heat(), 2);
    assert!(!weapon_loaded(&roster, s.mech, s.rifle));
    assert!(!roster.get(s.npc).unwrap().statuses.lock_on);
    assert_eq!(s.chat.messages().len(), 1);
    assert!(s.notifier.entries().is_empty());
}

#[tokio::test]
async fn cancelled_prompt_changes_nothing() {
    let s = scene(rifle(vec![TagInstance::new(tag::LOADING)]));
    let resolver =
        resolver(&s, EngineConfig::default(), vec![12]).with_prompt(Arc::new(CancelPrompt));
    let ctx = MacroContext::new(s.mech).with_targets(vec![s.npc]);

    assert!(resolver.prepare_attack(&ctx, s.rifle, Default::default()).await.is_none());

    let roster = s.store.snapshot().await;
    assert!(weapon_loaded(&roster, s.mech, s.rifle));
    assert!(roster.get(s.npc).unwrap().statuses.lock_on);
    assert!(s.chat.messages().is_empty());
    assert!(s.notifier.entries().is_empty());
}

#[tokio::test]
async fn unloaded_weapon_is_refused_with_a_warning() {
    let mut weapon = rifle(vec![TagInstance::new(tag::LOADING)]);
    if let ItemData::MechWeapon(w) = &mut weapon.data {
        w.loaded = false;
    }
    let s = scene(weapon);
    let resolver = resolver(&s, EngineConfig::default(), vec![12]);

    let card = resolver
        .prepare_attack(&MacroContext::new(s.mech), s.rifle, Default::default())
        .await;
    assert!(card.is_none());
    assert_eq!(
        s.notifier.entries(),
        vec![(NotifyLevel::Warning, "Weapon Rifle is not loaded!".to_string())]
    );
    assert!(s.chat.messages().is_empty());
}

#[tokio::test]
async fn manual_mode_skips_hit_checks_and_bookkeeping() {
    let mut weapon = rifle(vec![
        TagInstance::new(tag::LOADING),
        TagInstance::with_value(tag::HEAT_SELF, 2),
    ]);
    if let ItemData::MechWeapon(w) = &mut weapon.data {
        w.loaded = false;
    }
    let s = scene(weapon);
    let config = EngineConfig::default().with_automation(AutomationSettings::manual());
    let resolver = resolver(&s, config, vec![12, 3, 5]);
    let ctx = MacroContext::new(s.mech).with_targets(vec![s.npc]);

    let Some(ChatCard::Attack(card)) =
        resolver.prepare_attack(&ctx, s.rifle, Default::default()).await
    else {
        panic!("expected an attack card");
    };
    assert_eq!(card.attacks.len(), 1);
    assert!(card.hits.is_empty());
    assert!(!card.damages.is_empty());

    let roster = s.store.snapshot().await;
    assert_eq!(roster.get(s.mech).unwrap().current_heat(), 0);
    assert!(roster.get(s.npc).unwrap().statuses.lock_on);
}

#[tokio::test]
async fn overkill_heat_is_persisted() {
    let s = scene(rifle(vec![TagInstance::new(tag::OVERKILL)]));
    let resolver = resolver(&s, EngineConfig::default(), vec![15, 6, 2]);

    let Some(ChatCard::Attack(card)) = resolver
        .prepare_attack(&MacroContext::new(s.mech), s.rifle, Default::default())
        .await
    else {
        panic!("expected an attack card");
    };
    assert_eq!(card.damages[0].roll.total, 6);
    assert_eq!(card.overkill_heat, 1);

    let roster = s.store.snapshot().await;
    assert_eq!(roster.get(s.mech).unwrap().current_heat(), 1);
}

#[tokio::test]
async fn reroll_token_replays_the_attack() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![12, 3, 5]);
    let ctx = MacroContext::new(s.mech).with_targets(vec![s.npc]);

    let first = resolver
        .prepare_attack(&ctx, s.rifle, Default::default())
        .await
        .unwrap();
    let token = first.reroll_macro().unwrap().to_string();
    let descriptor = MacroDescriptor::decode(&token).unwrap();
    assert_eq!(descriptor.entry_point().unwrap(), MacroFn::EncodedAttack);

    let replay = resolver
        .run_encoded_macro(&MacroContext::default(), &token)
        .await
        .unwrap();
    let ChatCard::Attack(card) = replay else {
        panic!("expected an attack card");
    };
    assert_eq!(card.title, "Rifle");
    assert_eq!(card.hits.len(), 1);
    assert_eq!(card.hits[0].target_name, "Assault");
    assert_eq!(s.chat.messages().len(), 2);
}

fn attack_token(s: &Scene, options: serde_json::Value, accdiff: serde_json::Value) -> String {
    MacroDescriptor::new(
        "Reroll attack",
        MacroFn::EncodedAttack,
        vec![json!(s.mech), json!(s.rifle), options, accdiff],
    )
    .encode()
    .unwrap()
}

#[tokio::test]
async fn reroll_does_not_spend_lock_on_twice() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![12, 3, 5]);
    let ctx = MacroContext::new(s.mech).with_targets(vec![s.npc]);

    let Some(ChatCard::Attack(first)) =
        resolver.prepare_attack(&ctx, s.rifle, Default::default()).await
    else {
        panic!("expected an attack card");
    };
    assert_eq!(first.attacks[0].roll.formula, "1d20 + 2 + 1d6");
    assert!(!s.store.snapshot().await.get(s.npc).unwrap().statuses.lock_on);

    let Some(ChatCard::Attack(replay)) = resolver
        .run_encoded_macro(&MacroContext::default(), &first.reroll_macro)
        .await
    else {
        panic!("expected an attack card");
    };
    assert_eq!(replay.attacks[0].roll.formula, "1d20 + 2");
    assert_eq!(replay.hits[0].target_name, "Assault");
    assert!(s.notifier.entries().is_empty());
}

#[tokio::test]
async fn reroll_keeps_roll_modifier_plugins() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![10, 4]);
    let token = attack_token(
        &s,
        json!({}),
        json!({
            "title": "Rifle",
            "weapon_plugins": {
                "overclock": {
                    "id": "overclock",
                    "roll_precedence": 10,
                    "transform": { "kind": "add_flat", "amount": 3 }
                }
            },
            "base": { "accuracy": 0, "difficulty": 0, "cover": "none", "plugins": {} },
            "targets": []
        }),
    );

    let Some(ChatCard::Attack(card)) =
        resolver.run_encoded_macro(&MacroContext::default(), &token).await
    else {
        panic!("expected an attack card");
    };
    assert_eq!(card.attacks[0].roll.formula, "1d20 + 2 + 3");
    assert_eq!(card.attacks[0].roll.total, 15);

    let again = MacroDescriptor::decode(&card.reroll_macro).unwrap();
    let plugin = &again.args[3]["weapon_plugins"]["overclock"];
    assert_eq!(plugin["transform"]["amount"], 3);
    assert_eq!(plugin["roll_precedence"], 10);
}

#[tokio::test]
async fn extreme_accuracy_in_a_token_is_an_error_not_a_crash() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![10, 4]);
    let token = attack_token(
        &s,
        json!({}),
        json!({
            "title": "Rifle",
            "base": { "accuracy": i32::MAX, "difficulty": -1, "cover": "hard", "plugins": {} },
            "targets": []
        }),
    );

    assert!(resolver.run_encoded_macro(&MacroContext::default(), &token).await.is_none());
    let entries = s.notifier.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, NotifyLevel::Error);
    assert!(entries[0].1.contains("too many dice"), "{}", entries[0].1);
    assert!(s.chat.messages().is_empty());
}

#[tokio::test]
async fn most_negative_flat_bonus_in_a_token_is_an_error() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![10, 4]);
    let token = attack_token(
        &s,
        json!({}),
        json!({
            "title": "Rifle",
            "weapon_plugins": {
                "sink": {
                    "id": "sink",
                    "roll_precedence": 0,
                    "transform": { "kind": "add_flat", "amount": i64::MIN }
                }
            },
            "targets": []
        }),
    );

    assert!(resolver.run_encoded_macro(&MacroContext::default(), &token).await.is_none());
    let entries = s.notifier.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, NotifyLevel::Error);
    assert!(entries[0].1.contains("out of range"), "{}", entries[0].1);
}

#[tokio::test]
async fn huge_accuracy_bonus_in_a_token_saturates() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![10, 4]);
    let token = attack_token(
        &s,
        json!({ "acc_bonus": i32::MAX }),
        json!({ "title": "Rifle", "targets": [] }),
    );

    let Some(ChatCard::Attack(card)) =
        resolver.run_encoded_macro(&MacroContext::default(), &token).await
    else {
        panic!("expected an attack card");
    };
    assert_eq!(card.attacks[0].roll.formula, format!("1d20 + {}", i32::MAX));
    assert!(s.notifier.entries().is_empty());
}

#[tokio::test]
async fn untyped_damage_warns_and_still_attacks() {
    let weapon = Item::new(
        "Rifle",
        ItemData::MechWeapon(MechWeapon::with_profile(MechWeaponProfile {
            name: "Standard".into(),
            damage: vec![Damage {
                value: "2".into(),
                damage_type: None,
            }],
            tags: Vec::new(),
            effect: String::new(),
            on_hit: String::new(),
        })),
    );
    let s = scene(weapon);
    let resolver = resolver(&s, EngineConfig::default(), vec![12, 3]);
    let ctx = MacroContext::new(s.mech).with_targets(vec![s.npc]);

    let card = resolver.prepare_attack(&ctx, s.rifle, Default::default()).await;
    let Some(ChatCard::Attack(card)) = card else {
        panic!("expected an attack card");
    };
    assert_eq!(card.damages[0].roll.total, 2);
    assert_eq!(card.damages[0].damage_type, None);

    let entries = s.notifier.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, NotifyLevel::Warning);
    assert!(entries[0].1.contains("has a damage value without type!"));
    assert_eq!(s.chat.messages().len(), 1);
}

#[tokio::test]
async fn overheat_warns_when_structure_is_automated() {
    let s = scene(rifle(vec![TagInstance::with_value(tag::HEAT_SELF, 8)]));
    let resolver = resolver(&s, EngineConfig::default(), vec![12, 3, 5]);

    let card = resolver
        .prepare_attack(&MacroContext::new(s.mech), s.rifle, Default::default())
        .await;
    assert!(card.is_some());
    assert_eq!(
        s.notifier.entries(),
        vec![(NotifyLevel::Warning, "Heat exceeds capacity by 2".to_string())]
    );
    assert_eq!(s.store.snapshot().await.get(s.mech).unwrap().current_heat(), 6);
}

#[tokio::test]
async fn overheat_is_quiet_when_structure_is_manual() {
    let s = scene(rifle(vec![TagInstance::with_value(tag::HEAT_SELF, 8)]));
    let automation = AutomationSettings {
        structure: false,
        ..AutomationSettings::default()
    };
    let config = EngineConfig::default().with_automation(automation);
    let resolver = resolver(&s, config, vec![12, 3, 5]);

    let card = resolver
        .prepare_attack(&MacroContext::new(s.mech), s.rifle, Default::default())
        .await;
    assert!(card.is_some());
    assert!(s.notifier.entries().is_empty());
    assert_eq!(s.store.snapshot().await.get(s.mech).unwrap().current_heat(), 6);
}

#[tokio::test]
async fn functions_off_the_allow_list_are_rejected() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![12]);
    let descriptor = MacroDescriptor {
        title: "Evil".into(),
        function: "deleteEverything".into(),
        args: vec![json!(s.mech)],
        icon_path: None,
    };

    assert!(resolver.invoke(&MacroContext::default(), &descriptor).await.is_none());
    assert!(resolver.hotbar_drop(&descriptor).is_none());

    let entries = s.notifier.entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|(level, _)| *level == NotifyLevel::Error));
    assert!(s.chat.messages().is_empty());
}

#[tokio::test]
async fn hotbar_drop_stores_allowed_macros() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![12]);
    let descriptor = MacroDescriptor::new("Hull", MacroFn::Stat, vec![json!(s.mech), json!("mm.Hull")]);

    let stored = resolver.hotbar_drop(&descriptor).unwrap();
    assert_eq!(stored.name, "Hull");
    let card = resolver
        .run_encoded_macro(&MacroContext::default(), &stored.command)
        .await
        .unwrap();
    let ChatCard::Stat(card) = card else {
        panic!("expected a stat card");
    };
    assert_eq!(card.title, "HULL");
    assert_eq!(card.roll.formula, "1d20 + 2");
    assert_eq!(card.roll.total, 14);
}

#[tokio::test]
async fn stat_roll_with_accuracy() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![10, 2, 5])
        .with_prompt(Arc::new(PresetPrompt::new(2, 0)));

    let Some(ChatCard::Stat(card)) = resolver
        .prepare_stat(&MacroContext::new(s.mech), "mm.Hull", None)
        .await
    else {
        panic!("expected a stat card");
    };
    assert_eq!(card.roll.formula, "1d20 + 2 + 2d6kh1");
    assert_eq!(card.roll.total, 17);
}

#[tokio::test]
async fn tech_attack_stat_routes_to_tech_attack() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![7, 1]);
    let ctx = MacroContext::new(s.mech).with_targets(vec![s.npc]);

    let Some(ChatCard::TechAttack(card)) = resolver.prepare_stat(&ctx, "mm.TechAttack", None).await
    else {
        panic!("expected a tech attack card");
    };
    assert_eq!(card.title, "TECH ATTACK");
    assert_eq!(card.action, "Quick");
    // 7 + 1 + 1 against E-Defense 8.
    assert!(card.hits[0].hit);
    let token = MacroDescriptor::decode(&card.reroll_macro).unwrap();
    assert_eq!(token.entry_point().unwrap(), MacroFn::Stat);
    assert_eq!(token.args.len(), 3);
}

#[tokio::test]
async fn unknown_stat_is_an_error() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![10]);

    assert!(resolver.prepare_stat(&MacroContext::new(s.mech), "mm.Charisma", None).await.is_none());
    assert_eq!(s.notifier.entries()[0].0, NotifyLevel::Error);
}

#[tokio::test]
async fn core_power_is_spent_once() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![10]);
    let ctx = MacroContext::new(s.mech);

    let Some(ChatCard::Text(card)) = resolver.prepare_core_active(&ctx).await else {
        panic!("expected a text card");
    };
    assert_eq!(card.title, "Hyperspec Fuel Injector");
    assert_eq!(s.store.snapshot().await.get(s.mech).unwrap().core_energy, 0);

    assert!(resolver.prepare_core_active(&ctx).await.is_none());
    assert_eq!(
        s.notifier.entries(),
        vec![(NotifyLevel::Warning, "No core power remaining on this frame!".to_string())]
    );
}

#[tokio::test]
async fn declining_core_power_is_silent() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![10])
        .with_prompt(Arc::new(PresetPrompt::new(0, 0).with_confirm(false)));

    assert!(resolver.prepare_core_active(&MacroContext::new(s.mech)).await.is_none());
    assert_eq!(s.store.snapshot().await.get(s.mech).unwrap().core_energy, 1);
    assert!(s.notifier.entries().is_empty());
}

#[tokio::test]
async fn overcharge_steps_level_and_heat() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![3]);
    let ctx = MacroContext::new(s.mech);

    let Some(ChatCard::Overcharge(first)) = resolver.prepare_overcharge(&ctx).await else {
        panic!("expected an overcharge card");
    };
    assert_eq!(first.level, 0);
    assert_eq!(first.roll.total, 1);

    let Some(ChatCard::Overcharge(second)) = resolver.prepare_overcharge(&ctx).await else {
        panic!("expected an overcharge card");
    };
    assert_eq!(second.level, 1);
    assert_eq!(second.roll.formula, "1d3");
    assert_eq!(second.roll.total, 3);

    let roster = s.store.snapshot().await;
    let mech = roster.get(s.mech).unwrap();
    assert_eq!(mech.overcharge_count, 2);
    assert_eq!(mech.current_heat(), 4);
}

#[tokio::test]
async fn npcs_cannot_overcharge() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![3]);

    assert!(resolver.prepare_overcharge(&MacroContext::new(s.npc)).await.is_none());
    assert_eq!(
        s.notifier.entries(),
        vec![(NotifyLevel::Warning, "Only mechs can overcharge!".to_string())]
    );
}

#[tokio::test]
async fn recharge_without_uncharged_features_posts_nothing() {
    let s = scene(rifle(Vec::new()));
    let resolver = resolver(&s, EngineConfig::default(), vec![6]);

    assert!(resolver.prepare_recharge(&MacroContext::new(s.npc)).await.is_none());
    assert!(s.chat.messages().is_empty());
    assert!(s.notifier.entries().is_empty());
}

#[tokio::test]
async fn npc_weapon_feature_attacks_through_item_dispatch() {
    let mut roster = Roster::new();
    let mut npc = Actor::new(ActorKind::Npc, "Sniper");
    npc.stats.tier = 2;
    let feature = Item::new(
        "Long Rifle",
        ItemData::NpcFeature(NpcFeature {
            feature_type: lc_core::NpcFeatureType::Weapon,
            attack_bonus: vec![1, 2, 3],
            accuracy: vec![1, 1, 1],
            damage: vec![
                vec![Damage::new("4", DamageType::Kinetic)],
                vec![Damage::new("6", DamageType::Kinetic)],
                vec![Damage::new("8", DamageType::Kinetic)],
            ],
            ..Default::default()
        }),
    );
    let feature_id = feature.id;
    npc.items.push(feature);
    let npc_id = roster.add_actor(npc).unwrap();

    let store = Arc::new(MemoryStore::new(roster));
    let resolver = Resolver::new(store, EngineConfig::default())
        .with_dice(Arc::new(LocalRoller::new(FixedDice::new(vec![9, 4]))));

    let Some(ChatCard::Attack(card)) = resolver
        .prepare_item(&MacroContext::new(npc_id), feature_id, Default::default())
        .await
    else {
        panic!("expected an attack card");
    };
    assert_eq!(card.attacks[0].roll.formula, "1d20 + 2 + 1d6");
    assert_eq!(card.attacks[0].roll.total, 15);
    assert_eq!(card.damages[0].roll.total, 6);
    assert_eq!(card.self_heat, 0);
}

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use lc_core::TagInstance;
use lc_mechanics::card::{AttackCard, RechargeCard, TechAttackCard};
use lc_mechanics::damage::DamageResult;
use lc_mechanics::hit::{AttackResult, HitResult};
use lc_mechanics::{ChatCard, EvaluatedRoll};

pub fn print_roll(roll: &EvaluatedRoll) {
    println!("  {}", roll.formula.bold());
    println!("  {}", roll.tooltip().dimmed());
    println!("  = {}", roll.total.to_string().bold());
}

pub fn print_card(card: &ChatCard) {
    println!("  {}", card.title().bold());
    println!();

    match card {
        ChatCard::Attack(c) => print_attack(c),
        ChatCard::TechAttack(c) => print_tech(c),
        ChatCard::Stat(c) => {
            print_roll(&c.roll);
            print_text("effect", c.effect.as_deref());
        }
        ChatCard::Text(c) => {
            if let Some(roll) = &c.roll {
                print_roll(roll);
                println!();
            }
            for line in c.description.lines() {
                println!("  {}", line.trim());
            }
            print_tags(&c.tags);
        }
        ChatCard::Reaction(c) => {
            println!("  trigger: {}", c.trigger);
            println!("  effect:  {}", c.effect);
            print_tags(&c.tags);
        }
        ChatCard::Overcharge(c) => {
            println!("  overcharge level {}", c.level);
            print_roll(&c.roll);
        }
        ChatCard::Recharge(c) => print_recharge(c),
    }

    if let Some(token) = card.reroll_macro() {
        println!();
        println!("  {} {}", "reroll:".dimmed(), token);
    }
}

// ---------------------------------------------------------------------------
// Card sections
// ---------------------------------------------------------------------------

fn print_attack(card: &AttackCard) {
    print_attacks(&card.attacks);
    print_hits(&card.hits, &card.defense);
    print_damages("damage", &card.damages);
    print_damages("crit damage", &card.crit_damages);
    if card.overkill_heat > 0 {
        println!("  {} {}", "overkill heat:".red(), card.overkill_heat);
    }
    if card.self_heat > 0 {
        println!("  {} {}", "self heat:".red(), card.self_heat);
    }
    print_text("on hit", card.on_hit.as_deref());
    print_text("effect", card.effect.as_deref());
    print_tags(&card.tags);
}

fn print_tech(card: &TechAttackCard) {
    println!("  [{}]", card.action.dimmed());
    print_attacks(&card.attacks);
    print_hits(&card.hits, "E-DEF");
    print_text("effect", card.effect.as_deref());
    print_tags(&card.tags);
}

fn print_recharge(card: &RechargeCard) {
    print_roll(&card.roll);
    println!();
    for entry in &card.changed {
        let target = entry
            .target
            .map(|t| format!("{t}+"))
            .unwrap_or_else(|| "-".into());
        let status = if entry.charged {
            "charged".green()
        } else {
            "uncharged".dimmed()
        };
        println!("  {:<24} {:>4}  {status}", entry.name, target);
    }
}

fn print_attacks(attacks: &[AttackResult]) {
    for attack in attacks {
        println!("  {} {}", attack.roll.formula, attack.tooltip.dimmed());
    }
}

fn print_hits(hits: &[HitResult], defense: &str) {
    if hits.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Target", "Total", defense, "Crit"]);
    for hit in hits {
        let outcome = if hit.hit { "HIT" } else { "MISS" };
        let crit = if hit.crit { "CRIT" } else { "" };
        table.add_row(vec![hit.target_name.as_str(), hit.total.as_str(), outcome, crit]);
    }
    println!("{table}");
}

fn print_damages(label: &str, damages: &[DamageResult]) {
    for damage in damages {
        let kind = damage
            .damage_type
            .map(|t| t.to_string())
            .unwrap_or_default();
        println!(
            "  {label}: {} {kind} {}",
            damage.roll.total.to_string().bold(),
            damage.tooltip.dimmed()
        );
    }
}

fn print_text(label: &str, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        println!("  {label}: {text}");
    }
}

fn print_tags(tags: &[TagInstance]) {
    if tags.is_empty() {
        return;
    }
    let names: Vec<String> = tags
        .iter()
        .map(|t| match &t.value {
            Some(v) => format!("{} {v}", t.lid),
            None => t.lid.clone(),
        })
        .collect();
    println!("  tags: {}", names.join(", ").dimmed());
}

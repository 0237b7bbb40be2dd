//! Text rendering of battle events and panels.
use battle_core::BattlePhase;
use battle_runtime::{MessageLevel, NarrationEvent, PresentationEvent, TurnEvent};
use client_frontend_core::{Hotbar, SkillCatalog, StatusCard};

pub fn narration(line: &NarrationEvent) -> String {
    match line.level {
        MessageLevel::Info => format!("» {}", line.text),
        MessageLevel::Warning => format!("! {}", line.text),
        MessageLevel::Error => format!("x {}", line.text),
    }
}

pub fn cue(event: &PresentationEvent) -> String {
    match event {
        PresentationEvent::MoveAnimated {
            actor,
            destination,
            reached,
        } => {
            if *reached {
                format!("  {actor} moves to {destination}")
            } else {
                format!("  {actor} heads to {destination}")
            }
        }
        PresentationEvent::Indicator(indicator) => match &indicator.label {
            Some(label) => format!("  [{}] {label}", indicator.position),
            None if indicator.amount == 0 => format!("  [{}] ...", indicator.position),
            None => format!(
                "  [{}] -{} ({})",
                indicator.position, indicator.amount, indicator.tone
            ),
        },
        PresentationEvent::Rejection { actor, label, .. } => format!("  {actor}: {label}"),
    }
}

/// Turn lines worth printing; control toggles stay silent.
pub fn turn(event: &TurnEvent) -> Option<String> {
    match event {
        TurnEvent::PhaseChanged {
            to, current_turn, ..
        } => Some(match (to, current_turn) {
            (BattlePhase::PlayerTurn, _) => "-- your turn --".to_string(),
            (BattlePhase::OpponentTurn, Some(actor)) => format!("-- {actor} is acting --"),
            (phase, _) => format!("-- {phase} --"),
        }),
        TurnEvent::BattleEnded(outcome) => Some(format!("== {outcome} ==")),
        TurnEvent::ControlsEnabled(_) => None,
    }
}

pub fn status_card(card: Option<&StatusCard>) -> Vec<String> {
    let Some(card) = card else {
        return vec!["(no player data yet)".to_string()];
    };
    let mut lines = vec![format!("{}  {}", card.name, card.class_line)];
    lines.extend(
        card.bars
            .iter()
            .map(|bar| format!("  {:<10}{} {}/{}", bar.label, bar.gauge(10), bar.current, bar.maximum)),
    );
    lines
}

pub fn hotbar(hotbar: &Hotbar, catalog: &SkillCatalog) -> String {
    hotbar
        .iter()
        .map(|(key, slot)| match slot {
            Some(id) => format!("[{key}] {}", catalog.resolve(id).name),
            None => format!("[{key}] -"),
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn skills(catalog: &SkillCatalog) -> Vec<String> {
    if catalog.is_empty() {
        return vec!["(no skills loaded)".to_string()];
    }
    catalog
        .iter()
        .map(|skill| {
            if skill.narrative.is_empty() {
                format!("  {:<20}{}", skill.id, skill.name)
            } else {
                format!("  {:<20}{} - {}", skill.id, skill.name, skill.narrative)
            }
        })
        .collect()
}

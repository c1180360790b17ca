//! Plain-text rendering of a scoped view
//!
//! Used by the command-line tools. Everything printed goes through a
//! [`ScopedView`], so hidden hands never show up here.

use crate::core::{
    Battlefield, BattlefieldControl, CardInstance, PlayerState, Prompt, DEFAULT_MAX_SELECTIONS,
};
use crate::session::prompt::{prompt_display, PromptDisplay};
use crate::view::{units_on_battlefield, ScopedView};
use std::fmt::Write;

/// One-line label for a card: name, might and exhausted marker
pub fn card_label(card: &CardInstance) -> String {
    let mut label = card.name.clone();
    if let Some(might) = card.might {
        let _ = write!(label, " [{might}]");
    }
    if card.exhausted {
        label.push_str(" (exhausted)");
    }
    label
}

/// Control label for a battlefield, from the point of view of `viewer`
pub fn control_label(battlefield: &Battlefield, view: &ScopedView) -> String {
    match battlefield.control() {
        BattlefieldControl::Unclaimed => "unclaimed".to_string(),
        BattlefieldControl::Contested => {
            let names: Vec<_> = battlefield
                .contested_by
                .iter()
                .map(|id| player_name(view, id.as_str()))
                .collect();
            format!("contested by {}", names.join(", "))
        }
        BattlefieldControl::Controlled => match &battlefield.controller {
            Some(id) if view.viewer() == Some(id) => "controlled by you".to_string(),
            Some(id) => format!("controlled by {}", player_name(view, id.as_str())),
            None => "unclaimed".to_string(),
        },
    }
}

fn player_name(view: &ScopedView, id: &str) -> String {
    view.state()
        .players
        .iter()
        .find(|p| p.player_id.as_str() == id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Prompt line for the viewer
pub fn prompt_line(view: &ScopedView) -> String {
    let Some(viewer) = view.viewer() else {
        let pending = view.state().pending_prompts().filter(|p| p.kind().is_some()).count();
        return match pending {
            0 => "Prompt: none".to_string(),
            n => format!("Prompt: {n} pending for players"),
        };
    };
    match prompt_display(view.state(), viewer) {
        PromptDisplay::Active(prompt) => format!("Prompt: {}", describe_prompt(prompt)),
        PromptDisplay::AwaitingOpponent => "Prompt: waiting for opponent".to_string(),
        PromptDisplay::Idle => "Prompt: none".to_string(),
    }
}

/// Short description of a prompt and its payload
pub fn describe_prompt(prompt: &Prompt) -> String {
    let Some(kind) = prompt.kind() else {
        return format!("{} ({})", prompt.prompt_type, prompt.id);
    };
    let mut text = format!("{kind} ({})", prompt.id);
    if kind.is_multi_select() {
        let max = prompt.max_selections().unwrap_or(DEFAULT_MAX_SELECTIONS);
        let _ = write!(text, ", choose up to {max}");
    }
    let options = prompt.options();
    if !options.is_empty() {
        let _ = write!(text, " from {}", options.join(", "));
    }
    let battlefields = prompt.battlefield_choices();
    if !battlefields.is_empty() {
        let ids: Vec<_> = battlefields.iter().map(|b| b.as_str()).collect();
        let _ = write!(text, ": {}", ids.join(", "));
    }
    if let Some(trigger) = prompt.trigger() {
        let _ = write!(text, " after {trigger}");
    }
    text
}

fn render_player(out: &mut String, view: &ScopedView, player: &PlayerState, graveyard_window: usize) {
    let is_me = view.viewer() == Some(&player.player_id);
    let marker = if is_me { " (you)" } else { "" };
    let acting = if player.can_act { " *" } else { "" };
    let _ = writeln!(out, "\n{}{}{}:", player.name, marker, acting);
    let _ = writeln!(
        out,
        "  Points: {} | Mana: {} | Resources: {} | Deck: {}",
        player.victory_points,
        player.mana_pool,
        player.resources.total(),
        player.deck_size
    );

    match &player.hand {
        Some(hand) if is_me => {
            let cards: Vec<_> = hand
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{i}:{}", card_label(c)))
                .collect();
            let _ = writeln!(out, "  Hand: {}", cards.join(", "));
        }
        _ => {
            let _ = writeln!(out, "  Hand: {} cards", player.visible_hand_size());
        }
    }

    let runes = view.rune_slots(player);
    let grid: String = runes.iter().map(|slot| if slot.is_some() { 'o' } else { '.' }).collect();
    let _ = writeln!(out, "  Runes: [{grid}] {}/{}", runes.filled(), runes.len());

    let listing = view.board_listing(player);
    let special = |slot: Option<&CardInstance>| slot.map(card_label).unwrap_or_else(|| "-".to_string());
    let _ = writeln!(
        out,
        "  Legend: {} | Leader: {}",
        special(listing.legend),
        special(listing.leader)
    );
    for (title, cards) in [
        ("Units", &listing.units),
        ("Gear", &listing.gear),
        ("Enchantments", &listing.enchantments),
    ] {
        if cards.is_empty() {
            continue;
        }
        let labels: Vec<_> = cards
            .iter()
            .map(|c| match c.battlefield_id() {
                Some(bf) => format!("{} @{bf}", card_label(c)),
                None => card_label(c),
            })
            .collect();
        let _ = writeln!(out, "  {title}: {}", labels.join(", "));
    }

    let graveyard = view.graveyard(player, graveyard_window);
    if !graveyard.recent.is_empty() {
        let names: Vec<_> = graveyard.recent.iter().map(|c| c.name.as_str()).collect();
        let more = if graveyard.hidden > 0 {
            format!(" (+{} more)", graveyard.hidden)
        } else {
            String::new()
        };
        let _ = writeln!(out, "  Graveyard: {}{more}", names.join(", "));
    }
}

/// Full text summary of `view`
pub fn render(view: &ScopedView, graveyard_window: usize) -> String {
    let state = view.state();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Match {} | {} | turn {} | {}",
        state.match_id,
        state.status,
        state.turn_number,
        if state.phase.is_empty() { "-" } else { state.phase.as_str() }
    );

    if let Some(window) = &state.priority_window {
        let _ = writeln!(
            out,
            "Priority: {} ({})",
            player_name(view, window.holder_player_id.as_str()),
            window.trigger
        );
    }
    if let Some(combat) = &state.combat {
        let _ = writeln!(
            out,
            "Combat at {}: {} attacks {}",
            combat.battlefield_id,
            player_name(view, combat.attacker_id.as_str()),
            player_name(view, combat.defender_id.as_str())
        );
    }

    let mut players: Vec<&PlayerState> = view.me().into_iter().collect();
    players.extend(view.opponents());
    for player in players {
        render_player(&mut out, view, player, graveyard_window);
    }

    if !state.battlefields.is_empty() {
        let _ = writeln!(out, "\nBattlefields:");
        for battlefield in &state.battlefields {
            let _ = writeln!(
                out,
                "  {} ({}) - {}",
                battlefield.card.name,
                battlefield.battlefield_id,
                control_label(battlefield, view)
            );
            for (owner, units) in units_on_battlefield(state, &battlefield.battlefield_id) {
                let labels: Vec<_> = units.iter().map(|u| card_label(u)).collect();
                let _ = writeln!(
                    out,
                    "    {}: {}",
                    player_name(view, owner.as_str()),
                    labels.join(", ")
                );
            }
        }
    }

    let _ = writeln!(out, "\n{}", prompt_line(view));
    out
}

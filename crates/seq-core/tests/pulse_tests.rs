// Pulse tests: phase alternation, diamond rotation accrual and wrap, special
// effect bookkeeping and the guarantee that stopping clears everything the
// pulse ever styled.

use seq_core::config::Player;
use seq_core::grid::CellKey;
use seq_core::note::Shape;
use seq_core::pulse::{preset_for, PulseOp, PulsePhase, PulseState};

fn cell(position: u32, player: Player) -> CellKey {
    CellKey::new(position, player)
}

fn style_presets(ops: &[PulseOp]) -> Vec<(CellKey, f32, f32)> {
    ops.iter()
        .filter_map(|op| match op {
            PulseOp::Style { cell, preset } => Some((*cell, preset.scale, preset.rotation_deg)),
            _ => None,
        })
        .collect()
}

#[test]
fn beats_alternate_active_and_rest() {
    let mut pulse = PulseState::new();
    pulse.start();
    let sounding = [(cell(1, Player::A), Shape::Square)];
    let mut ops = Vec::new();

    for index in 0..6 {
        ops.clear();
        pulse.beat(&sounding, &mut ops);
        let expected = if index % 2 == 0 {
            PulsePhase::Active
        } else {
            PulsePhase::Rest
        };
        assert_eq!(pulse.phase(), expected, "beat {index}");
        let styles = style_presets(&ops);
        assert_eq!(styles.len(), 1);
        if expected == PulsePhase::Active {
            assert!(styles[0].1 > 1.0, "active phase enlarges the shape");
        } else {
            assert_eq!(styles[0].1, 1.0, "rest phase returns to unit scale");
        }
    }
}

#[test]
fn beats_do_nothing_before_start_or_after_stop() {
    let mut pulse = PulseState::new();
    let sounding = [(cell(1, Player::A), Shape::Circle)];
    let mut ops = Vec::new();
    pulse.beat(&sounding, &mut ops);
    assert!(ops.is_empty(), "no styling before start");

    pulse.start();
    pulse.beat(&sounding, &mut ops);
    ops.clear();
    pulse.stop(&mut ops);
    ops.clear();
    pulse.beat(&sounding, &mut ops);
    assert!(ops.is_empty(), "no styling after stop");
}

#[test]
fn diamond_rotation_advances_per_pair_and_wraps() {
    let mut pulse = PulseState::new();
    pulse.start();
    let sounding = [(cell(2, Player::A), Shape::Diamond)];
    let mut ops = Vec::new();

    let mut seen = Vec::new();
    for _ in 0..20 {
        ops.clear();
        pulse.beat(&sounding, &mut ops);
        seen.push(style_presets(&ops)[0].2);
    }
    // Two beats per pair: 0,0,45,45,90,90,...; the ninth pair wraps to 0.
    assert_eq!(seen[0], 0.0);
    assert_eq!(seen[1], 0.0);
    assert_eq!(seen[2], 45.0);
    assert_eq!(seen[3], 45.0);
    assert_eq!(seen[8], 180.0);
    assert_eq!(seen[14], 315.0);
    assert_eq!(seen[16], 0.0, "rotation wraps after a full turn");
}

#[test]
fn rotation_carries_through_rest_only_for_diamonds() {
    let rest_diamond = preset_for(Shape::Diamond, PulsePhase::Rest, 135.0);
    assert_eq!(rest_diamond.rotation_deg, 135.0);
    let rest_square = preset_for(Shape::Square, PulsePhase::Rest, 135.0);
    assert_eq!(rest_square.rotation_deg, 0.0);
    let active_circle = preset_for(Shape::Circle, PulsePhase::Active, 135.0);
    assert_eq!(active_circle.rotation_deg, 0.0);
}

#[test]
fn active_presets_differ_per_shape() {
    let shapes = [Shape::Triangle, Shape::Diamond, Shape::Circle, Shape::Square];
    let mut scales = Vec::new();
    for shape in shapes {
        let preset = preset_for(shape, PulsePhase::Active, 0.0);
        assert!(preset.scale > 1.0, "{shape:?} grows on the beat");
        assert_eq!(preset.glow, 1.0);
        scales.push(preset.scale);
    }
    scales.dedup();
    assert_eq!(scales.len(), 4, "each shape has its own active scale");
}

#[test]
fn cells_that_fall_silent_get_an_explicit_clear() {
    let mut pulse = PulseState::new();
    pulse.start();
    let mut ops = Vec::new();
    pulse.beat(&[(cell(1, Player::A), Shape::Square)], &mut ops);
    ops.clear();

    pulse.beat(&[(cell(4, Player::B), Shape::Circle)], &mut ops);
    assert!(
        ops.contains(&PulseOp::ClearStyle {
            cell: cell(1, Player::A)
        }),
        "the cell styled last beat is cleared once it stops sounding"
    );
}

#[test]
fn special_effects_toggle_once_per_state_change() {
    let mut pulse = PulseState::new();
    let mut ops = Vec::new();
    pulse.show_effect(4, &mut ops);
    pulse.show_effect(4, &mut ops);
    assert_eq!(ops, vec![PulseOp::ShowEffect { note: 4 }]);
    assert!(pulse.active_effects().contains(&4));

    ops.clear();
    pulse.hide_effect(4, &mut ops);
    pulse.hide_effect(4, &mut ops);
    assert_eq!(ops, vec![PulseOp::HideEffect { note: 4 }]);
    assert!(pulse.active_effects().is_empty());
}

#[test]
fn stop_clears_every_styled_cell_and_resets_rotation() {
    let mut pulse = PulseState::new();
    pulse.start();
    let sounding = [
        (cell(1, Player::A), Shape::Triangle),
        (cell(2, Player::A), Shape::Diamond),
    ];
    let mut ops = Vec::new();
    for _ in 0..5 {
        pulse.beat(&sounding, &mut ops);
    }
    ops.clear();

    pulse.stop(&mut ops);
    let cleared: Vec<CellKey> = ops
        .iter()
        .filter_map(|op| match op {
            PulseOp::ClearStyle { cell } => Some(*cell),
            _ => None,
        })
        .collect();
    assert_eq!(cleared.len(), 2, "both styled cells are cleared");
    assert!(cleared.contains(&cell(1, Player::A)));
    assert!(cleared.contains(&cell(2, Player::A)));
    assert!(!pulse.is_running());
    assert_eq!(pulse.diamond_rotation_deg(), 0.0);

    ops.clear();
    pulse.stop(&mut ops);
    assert!(ops.is_empty(), "second stop has nothing left to clear");
}

#[test]
fn stop_keeps_special_effects_but_teardown_hides_them() {
    let mut pulse = PulseState::new();
    let mut ops = Vec::new();
    pulse.show_effect(2, &mut ops);
    pulse.start();
    pulse.beat(&[(cell(2, Player::A), Shape::Diamond)], &mut ops);
    ops.clear();

    pulse.stop(&mut ops);
    assert!(
        pulse.active_effects().contains(&2),
        "special effects follow placement, not the transport"
    );

    ops.clear();
    pulse.teardown(&mut ops);
    assert!(ops.contains(&PulseOp::HideEffect { note: 2 }));
    assert!(pulse.active_effects().is_empty());
}

#[test]
fn restart_begins_on_a_fresh_active_phase() {
    let mut pulse = PulseState::new();
    pulse.start();
    let sounding = [(cell(2, Player::A), Shape::Diamond)];
    let mut ops = Vec::new();
    for _ in 0..7 {
        pulse.beat(&sounding, &mut ops);
    }
    pulse.stop(&mut ops);

    pulse.start();
    ops.clear();
    pulse.beat(&sounding, &mut ops);
    assert_eq!(pulse.phase(), PulsePhase::Active);
    assert_eq!(style_presets(&ops)[0].2, 0.0, "rotation restarts from zero");
}

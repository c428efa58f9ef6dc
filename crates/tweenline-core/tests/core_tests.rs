use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tweenline_core::{step_value, Easing, Registry, Value};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

/// it should ease InQuad to 25 at the midpoint of a 0..100 over-10 tween
#[test]
fn in_quad_midpoint() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(100.0)
        .duration(10.0)
        .ease(Easing::InQuad);
    reg.update(5.0);
    // progress 0.5, eased 0.25
    assert_eq!(reg.get_value("x", Value::f(-1.0)), Value::f(25.0));
    assert!(reg.is_active("x"));
}

/// it should finish, park at the target, and pause when a seek runs off the end
#[test]
fn seek_past_end_finishes_and_pauses() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(100.0)
        .duration(10.0)
        .ease(Easing::InQuad);
    reg.seek(15.0, "x");

    assert_eq!(reg.get_scalar("x", f32::NAN), 100.0);
    assert!(reg.is_paused("x"));
    assert!(reg.get("x").expect("resident after seek").is_finished());
    // Unlike per-tick completion the manager stays inspectable.
    assert!(reg.is_active("x"));

    // Resuming play completes the chain through the normal path.
    reg.play("x");
    reg.update(1.0);
    assert!(!reg.is_active("x"));
}

/// it should remove a completed Once track and land exactly on the target
#[test]
fn once_track_completes_and_removes() {
    let final_value = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&final_value);

    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(50.0)
        .duration(5.0)
        .on_sequence_end(move |tr| {
            *seen.borrow_mut() = Some(tr.value().clone());
        });
    reg.update(2.0);
    assert!(reg.is_active("x"));
    reg.update(4.0);
    assert!(!reg.is_active("x"));
    assert_eq!(*final_value.borrow(), Some(Value::f(50.0)));
}

/// it should advance past a finite Loop only after plays are exhausted
#[test]
fn loop_budget_counts_total_plays() {
    let mut reg = Registry::new();
    // repeat(2) means three total plays before moving on.
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(10.0)
        .repeat(2)
        .next()
        .from(1.0)
        .to(2.0)
        .duration(10.0);

    reg.update(10.0);
    assert_eq!(reg.get("x").unwrap().index(), 0);
    reg.update(10.0);
    assert_eq!(reg.get("x").unwrap().index(), 0);
    reg.update(10.0);
    let tr = reg.get("x").unwrap();
    assert_eq!(tr.index(), 1);
    approx(tr.timer(), 0.0, 1e-6);
}

/// it should never advance an unbounded Loop
#[test]
fn loop_forever_never_advances() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(3.0)
        .repeat_forever();
    for _ in 0..50 {
        reg.update(2.0);
    }
    let tr = reg.get("x").unwrap();
    assert_eq!(tr.index(), 0);
    assert_eq!(tr.loops_remaining(), -1);
    assert!(reg.is_active("x"));
}

/// it should play one forward and one backward pass for a single ping-pong cycle
#[test]
fn pingpong_single_cycle_then_advance() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(10.0)
        .duration(10.0)
        .pingpong(1)
        .next()
        .from(10.0)
        .to(20.0)
        .duration(20.0);

    // Forward half.
    reg.update(6.0);
    approx(reg.get_scalar("x", f32::NAN), 6.0, 1e-5);

    // Reflect at the far edge: budget is consumed by the flip.
    reg.update(6.0);
    let tr = reg.get("x").unwrap();
    approx(tr.timer(), 8.0, 1e-5);
    assert_eq!(tr.direction(), -1.0);
    assert_eq!(tr.loops_remaining(), 0);

    // Return half.
    reg.update(6.0);
    approx(reg.get("x").unwrap().timer(), 2.0, 1e-5);

    // Crossing the near edge with no budget left advances, carrying the
    // unused part of the step into the next track.
    reg.update(6.0);
    let tr = reg.get("x").unwrap();
    assert_eq!(tr.index(), 1);
    approx(tr.timer(), 4.0, 1e-5);
    assert_eq!(tr.direction(), 1.0);
}

/// it should run a finite ping-pong for exactly its budgeted cycles
#[test]
fn pingpong_budget_counts_cycles() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(10.0)
        .pingpong(2)
        .next()
        .from(1.0)
        .to(2.0)
        .duration(40.0);

    // Four passes: out, back, out, back; the fifth step advances.
    for _ in 0..4 {
        reg.update(10.0);
        assert_eq!(reg.get("x").unwrap().index(), 0);
    }
    reg.update(10.0);
    assert_eq!(reg.get("x").unwrap().index(), 1);
}

/// it should clamp a Hold track at its far edge without ever completing
#[test]
fn hold_clamps_indefinitely() {
    let ended = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ended);

    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(5.0)
        .hold()
        .on_sequence_end(move |_| flag.set(true));

    for _ in 0..4 {
        reg.update(10.0);
    }
    let tr = reg.get("x").expect("hold stays resident");
    approx(tr.timer(), 5.0, 1e-6);
    assert_eq!(reg.get_scalar("x", f32::NAN), 1.0);
    assert!(!tr.is_finished());
    assert!(!ended.get());

    // Reversing the speed pulls it back off the edge.
    reg.set_speed(-1.0, "x");
    reg.update(2.0);
    approx(reg.get("x").unwrap().timer(), 3.0, 1e-6);
    approx(reg.get_scalar("x", f32::NAN), 0.6, 1e-5);
    assert!(!ended.get());
}

/// it should settle at the wall when driven backward past track 0
#[test]
fn backward_exhaustion_hits_the_wall() {
    let mut reg = Registry::new();
    reg.transition("x").from(0.0).to(1.0).duration(10.0);
    reg.update(3.0);
    reg.set_speed(-1.0, "x");
    reg.update(5.0);

    let tr = reg.get("x").expect("wall keeps the manager resident");
    approx(tr.timer(), 0.0, 1e-6);
    assert_eq!(tr.direction(), 1.0);
    assert!(!tr.is_finished());
    assert_eq!(reg.get_scalar("x", f32::NAN), 0.0);
}

/// it should reproduce timer and value bit-for-bit after a +X / -X seek pair
#[test]
fn seek_round_trip_is_exact() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(3.0)
        .to(97.0)
        .duration(10.0)
        .ease(Easing::InOutCubic);
    reg.update(3.25);

    let timer_before = reg.get("x").unwrap().timer();
    let value_before = reg.get_value("x", Value::f(f32::NAN));

    reg.seek(4.0, "x");
    reg.seek(-4.0, "x");

    let tr = reg.get("x").unwrap();
    assert_eq!(tr.timer(), timer_before);
    assert_eq!(reg.get_value("x", Value::f(f32::NAN)), value_before);
}

/// it should interpolate composite endpoints field-wise
#[test]
fn composite_tween_midpoint() {
    let mut reg = Registry::new();
    reg.transition("pos")
        .from([("x", 0.0), ("y", 0.0)])
        .to([("x", 10.0), ("y", 20.0)])
        .duration(10.0);
    reg.update(5.0);

    let v = reg.get_value("pos", Value::f(f32::NAN));
    assert_eq!(v.field("x"), Some(5.0));
    assert_eq!(v.field("y"), Some(10.0));
}

/// it should materialize a field missing from `from` at its target value
#[test]
fn missing_from_field_materializes_at_target() {
    let mut reg = Registry::new();
    reg.transition("pos")
        .from([("x", 0.0)])
        .to([("x", 10.0), ("y", 20.0)])
        .duration(10.0);
    reg.update(5.0);

    let v = reg.get_value("pos", Value::f(f32::NAN));
    assert_eq!(v.field("x"), Some(5.0));
    assert_eq!(v.field("y"), Some(20.0));
}

/// it should carry overflow out of a wait segment into the next track
#[test]
fn wait_segment_carries_overflow() {
    let wait_done = Rc::new(Cell::new(false));
    let flag = Rc::clone(&wait_done);

    let mut reg = Registry::new();
    reg.transition("x")
        .wait(5.0)
        .on_track_end(move |_| flag.set(true))
        .next()
        .from(0.0)
        .to(1.0)
        .duration(5.0);

    reg.update(3.0);
    assert!(!wait_done.get());
    assert_eq!(reg.get("x").unwrap().index(), 0);

    // 4 more ticks: 2 finish the wait, 2 land in the tween.
    reg.update(4.0);
    assert!(wait_done.get());
    let tr = reg.get("x").unwrap();
    assert_eq!(tr.index(), 1);
    approx(tr.timer(), 2.0, 1e-6);
    approx(reg.get_scalar("x", f32::NAN), 0.4, 1e-5);
}

/// it should resolve an instant track and its carry within one tick
#[test]
fn instant_track_resolves_in_one_tick() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(5.0)
        .duration(0.0)
        .next()
        .from(5.0)
        .to(10.0)
        .duration(10.0);

    reg.update(2.0);
    let tr = reg.get("x").unwrap();
    assert_eq!(tr.index(), 1);
    approx(tr.timer(), 2.0, 1e-6);
    approx(reg.get_scalar("x", f32::NAN), 6.0, 1e-5);
}

/// it should keep a manager resident when its end callback rewinds it
#[test]
fn rescue_from_sequence_end_callback() {
    let fired = Rc::new(Cell::new(0));
    let count = Rc::clone(&fired);

    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(5.0)
        .on_sequence_end(move |tr| {
            count.set(count.get() + 1);
            tr.rewind();
        });

    reg.update(6.0);
    assert_eq!(fired.get(), 1);
    let tr = reg.get("x").expect("rescued manager stays resident");
    assert_eq!(tr.index(), 0);
    approx(tr.timer(), 0.0, 1e-6);
    assert!(!tr.is_paused(), "auto-start pause state re-applied");

    // The restarted chain plays again and is rescued again.
    reg.update(6.0);
    assert_eq!(fired.get(), 2);
    assert!(reg.is_active("x"));
}

/// it should fire the end-of-sequence callback exactly once on natural completion
#[test]
fn sequence_end_fires_once() {
    let fired = Rc::new(Cell::new(0));
    let count = Rc::clone(&fired);

    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(5.0)
        .on_sequence_end(move |_| count.set(count.get() + 1));

    for _ in 0..5 {
        reg.update(2.0);
    }
    assert_eq!(fired.get(), 1);
    assert!(!reg.is_active("x"));
}

/// it should absorb an arbitrarily large seek into an unbounded Loop via modulo
#[test]
fn seek_modulo_into_infinite_loop() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(60.0)
        .repeat_forever();

    reg.seek(10_000.0, "x");
    let tr = reg.get("x").unwrap();
    assert_eq!(tr.timer(), 40.0); // 10000 mod 60
    assert_eq!(tr.index(), 0);
    assert!(!tr.is_finished());
    approx(reg.get_scalar("x", f32::NAN), 40.0 / 60.0, 1e-5);
}

/// it should reflect large seeks inside an unbounded ping-pong
#[test]
fn seek_modulo_into_infinite_pingpong() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(60.0)
        .pingpong_forever();

    // 130 mod 120 = 10: first half, moving out.
    reg.seek(130.0, "x");
    let tr = reg.get("x").unwrap();
    approx(tr.timer(), 10.0, 1e-4);
    assert_eq!(tr.direction(), 1.0);

    // 70 mod 120 = 70 > 60: return half, reflected to 50.
    reg.seek(60.0, "x");
    let tr = reg.get("x").unwrap();
    approx(tr.timer(), 50.0, 1e-4);
    assert_eq!(tr.direction(), -1.0);
}

/// it should not consume loop budget while scrubbing
#[test]
fn seek_preserves_loop_budget() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(10.0)
        .repeat(1); // two total plays

    reg.seek(25.0, "x");
    let tr = reg.get("x").unwrap();
    approx(tr.timer(), 5.0, 1e-6);
    assert_eq!(tr.loops_remaining(), 2);
    assert_eq!(tr.index(), 0);
}

/// it should cross track boundaries in both directions under seek
#[test]
fn seek_across_track_boundaries() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(10.0)
        .next()
        .from(1.0)
        .to(2.0)
        .duration(10.0);

    reg.seek(15.0, "x");
    let tr = reg.get("x").unwrap();
    assert_eq!(tr.index(), 1);
    approx(tr.timer(), 5.0, 1e-6);

    reg.seek(-8.0, "x");
    let tr = reg.get("x").unwrap();
    assert_eq!(tr.index(), 0);
    approx(tr.timer(), 7.0, 1e-6);
    assert_eq!(tr.direction(), 1.0);
}

/// it should park exactly on the edge for an exact-duration seek, then
/// complete on the next unpaused step
#[test]
fn seek_to_exact_duration_parks_then_completes() {
    let mut reg = Registry::new();
    reg.transition("x").from(0.0).to(1.0).duration(10.0);

    reg.seek(10.0, "x");
    let tr = reg.get("x").unwrap();
    assert!(!tr.is_finished());
    assert!(!tr.is_paused());
    assert_eq!(reg.get_scalar("x", f32::NAN), 1.0);

    reg.update(0.0);
    assert!(!reg.is_active("x"));
}

/// it should scale the step by the speed multiplier
#[test]
fn speed_scales_the_step() {
    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(10.0)
        .duration(10.0)
        .speed(2.0);
    reg.update(2.0);
    approx(reg.get_scalar("x", f32::NAN), 4.0, 1e-6);

    reg.set_speed(-1.0, "x");
    reg.update(1.0);
    approx(reg.get_scalar("x", f32::NAN), 3.0, 1e-6);
}

/// it should honor a per-transition interpolation strategy
#[test]
fn custom_lerp_strategy() {
    let mut reg = Registry::new();
    reg.transition_with("x", step_value)
        .from(0.0)
        .to(1.0)
        .duration(10.0);
    reg.update(5.0);
    // Step interpolation holds the start value until the weight reaches 1.
    assert_eq!(reg.get_scalar("x", f32::NAN), 0.0);
}

/// it should fire on_update after every recomputation of a live track
#[test]
fn on_update_fires_per_tick() {
    let ticks = Rc::new(Cell::new(0));
    let count = Rc::clone(&ticks);

    let mut reg = Registry::new();
    reg.transition("x")
        .from(0.0)
        .to(1.0)
        .duration(100.0)
        .on_update(move |_| count.set(count.get() + 1));

    for _ in 0..3 {
        reg.update(1.0);
    }
    assert_eq!(ticks.get(), 3);
}

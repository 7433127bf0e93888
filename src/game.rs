//! Frame loop
//!
//! Host-agnostic driver: the host supplies monotonic timestamps and a way to
//! schedule the next frame. Each frame ticks the world, renders it, and
//! republishes the HUD snapshot.

use crate::sim::{GameEvent, Snapshot, TickInput, World, normalize_dt, tick};

/// Host handle for a scheduled frame callback
pub type FrameHandle = i32;

/// Schedules frame callbacks (requestAnimationFrame on the web)
pub trait FrameScheduler {
    /// Ask for one more frame; `None` if the host refused
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Consumes the world after every frame
pub trait FrameRenderer {
    fn render(&mut self, world: &World);
}

/// Receives every published snapshot
pub trait SnapshotObserver {
    fn publish(&mut self, snapshot: &Snapshot);

    /// Events recorded during the frame, oldest first
    fn event(&mut self, _event: &GameEvent) {}
}

/// Game instance holding the world and loop bookkeeping
#[derive(Debug)]
pub struct Game {
    pub world: World,
    /// Intents written by input callbacks, read at the next frame
    pub input: TickInput,
    last_time: Option<f64>,
    pending: Option<FrameHandle>,
    running: bool,
    frames: u64,
}

impl Game {
    pub fn new(world: World) -> Self {
        Self {
            world,
            input: TickInput::default(),
            last_time: None,
            pending: None,
            running: false,
            frames: 0,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Frames run since construction
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.world.set_viewport(width, height);
    }

    /// Begin (or resume) scheduling frames
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.cancel_pending(scheduler);
        self.running = true;
        self.last_time = None;
        self.pending = scheduler.request_frame();
    }

    /// Stop scheduling; any pending callback is cancelled
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.running = false;
        self.cancel_pending(scheduler);
        log::info!("Frame loop stopped after {} frames", self.frames);
    }

    /// Cancel the pending frame, reset the world, and start again
    ///
    /// Held keys survive the reset; only one-shot inputs are dropped.
    pub fn restart<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.cancel_pending(scheduler);
        self.input.pause = false;
        self.input.restart = false;
        self.world.reset();
        self.start(scheduler);
    }

    fn cancel_pending<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
    }

    /// Run one frame at host time `now` (milliseconds)
    pub fn frame<S, R, O>(&mut self, now: f64, scheduler: &mut S, renderer: &mut R, observer: &mut O)
    where
        S: FrameScheduler + ?Sized,
        R: FrameRenderer + ?Sized,
        O: SnapshotObserver + ?Sized,
    {
        self.pending = None;
        if !self.running {
            return;
        }

        let elapsed = self.last_time.map_or(0.0, |last| now - last);
        self.last_time = Some(now);
        let dt = normalize_dt(elapsed, &self.world.tuning);

        tick(&mut self.world, &self.input, dt);
        // Clear one-shot inputs after processing
        self.input.pause = false;
        self.input.restart = false;
        self.frames += 1;

        renderer.render(&self.world);

        for event in self.world.drain_events() {
            observer.event(&event);
        }
        for snapshot in self.world.hud.drain() {
            observer.publish(&snapshot);
        }
        observer.publish(self.world.snapshot());

        self.pending = scheduler.request_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::apply_key;
    use crate::sim::{Grid, Status};
    use crate::tuning::Tuning;

    #[derive(Default)]
    struct RecordingScheduler {
        next: FrameHandle,
        requested: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for RecordingScheduler {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            self.next += 1;
            self.requested.push(self.next);
            Some(self.next)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }
    }

    #[derive(Default)]
    struct CountingRenderer(usize);

    impl FrameRenderer for CountingRenderer {
        fn render(&mut self, _world: &World) {
            self.0 += 1;
        }
    }

    #[derive(Default)]
    struct Published(Vec<Snapshot>, Vec<GameEvent>);

    impl SnapshotObserver for Published {
        fn publish(&mut self, snapshot: &Snapshot) {
            self.0.push(snapshot.clone());
        }

        fn event(&mut self, event: &GameEvent) {
            self.1.push(event.clone());
        }
    }

    fn flat_game(tuning: Tuning) -> Game {
        let grid = Grid::from_rows(&["..........", "..........", "..M.......", "##########"]).unwrap();
        Game::new(World::new(grid, tuning))
    }

    #[test]
    fn test_frame_renders_publishes_and_reschedules() {
        let mut game = flat_game(Tuning::default());
        let mut sched = RecordingScheduler::default();
        let mut renderer = CountingRenderer::default();
        let mut hud = Published::default();

        game.start(&mut sched);
        assert_eq!(game.pending_frame(), Some(1));

        game.frame(0.0, &mut sched, &mut renderer, &mut hud);
        game.frame(16.6667, &mut sched, &mut renderer, &mut hud);

        assert_eq!(renderer.0, 2);
        assert_eq!(hud.0.len(), 2);
        assert_eq!(sched.requested, vec![1, 2, 3]);
        assert_eq!(game.pending_frame(), Some(3));
        assert_eq!(game.frames(), 2);
    }

    #[test]
    fn test_first_frame_has_zero_dt() {
        let mut game = flat_game(Tuning::default());
        let mut sched = RecordingScheduler::default();
        game.start(&mut sched);
        game.frame(5000.0, &mut sched, &mut CountingRenderer::default(), &mut Published::default());
        assert_eq!(game.world.snapshot().time, 400.0);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut game = flat_game(Tuning::default());
        let mut sched = RecordingScheduler::default();
        let mut renderer = CountingRenderer::default();
        let mut hud = Published::default();
        game.start(&mut sched);
        game.frame(0.0, &mut sched, &mut renderer, &mut hud);
        game.frame(1000.0, &mut sched, &mut renderer, &mut hud);

        let lost = 400.0 - game.world.snapshot().time;
        assert!((lost - 32.0 / 16.6667 * 0.06).abs() < 1e-3);
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let mut game = flat_game(Tuning::default());
        let mut sched = RecordingScheduler::default();
        let mut renderer = CountingRenderer::default();
        game.start(&mut sched);
        game.stop(&mut sched);

        assert_eq!(sched.cancelled, vec![1]);
        assert!(!game.is_running());

        // a stale callback that still fires does nothing
        game.frame(16.0, &mut sched, &mut renderer, &mut Published::default());
        assert_eq!(renderer.0, 0);
        assert_eq!(sched.requested.len(), 1);
    }

    #[test]
    fn test_restart_cancels_then_reinitializes() {
        let mut game = flat_game(Tuning::default());
        let mut sched = RecordingScheduler::default();
        let mut renderer = CountingRenderer::default();
        let mut hud = Published::default();
        game.start(&mut sched);

        game.input.right = true;
        for i in 0..30 {
            game.frame(i as f64 * 16.6667, &mut sched, &mut renderer, &mut hud);
        }
        let spawn = game.world.spawns.player;
        assert!(game.world.player.pos.x > spawn.x);

        game.restart(&mut sched);
        assert_eq!(sched.cancelled, vec![31]);
        assert_eq!(game.pending_frame(), Some(32));
        assert_eq!(game.world.player.pos, spawn);

        hud.0.clear();
        game.frame(1000.0, &mut sched, &mut renderer, &mut hud);
        // reset publication first, then the frame snapshot
        assert_eq!(hud.0.len(), 2);
        assert!(hud.0.iter().all(|s| s.status == Status::Play && s.score == 0));
        assert_eq!(hud.1.last(), Some(&GameEvent::Restarted));
    }

    #[test]
    fn test_held_key_survives_restart() {
        let mut game = flat_game(Tuning::default());
        let mut sched = RecordingScheduler::default();
        let mut renderer = CountingRenderer::default();
        let mut hud = Published::default();
        game.start(&mut sched);

        apply_key(&mut game.input, "ArrowRight", true, false);
        for i in 0..5 {
            game.frame(i as f64 * 16.6667, &mut sched, &mut renderer, &mut hud);
        }
        game.input.pause = true;
        game.restart(&mut sched);
        assert!(game.input.right);
        assert!(!game.input.pause);

        // the key is still down, so only auto-repeat events arrive
        for i in 0..30 {
            apply_key(&mut game.input, "ArrowRight", true, true);
            game.frame(1000.0 + i as f64 * 16.6667, &mut sched, &mut renderer, &mut hud);
        }
        assert_eq!(game.world.status(), Status::Play);
        assert!(game.world.player.pos.x > game.world.spawns.player.x);
    }

    #[test]
    fn test_events_are_drained_every_frame() {
        let mut game = flat_game(Tuning::default());
        let mut sched = RecordingScheduler::default();
        let mut renderer = CountingRenderer::default();
        let mut hud = Published::default();
        game.start(&mut sched);

        for i in 0..1000 {
            game.input.pause = true;
            game.frame(i as f64 * 16.6667, &mut sched, &mut renderer, &mut hud);
            assert!(game.world.events.is_empty());
        }
        assert_eq!(hud.1.len(), 1000);
        assert_eq!(hud.1[0], GameEvent::Paused);
        assert_eq!(hud.1[1], GameEvent::Resumed);
    }

    #[test]
    fn test_event_snapshots_precede_frame_snapshot() {
        let tuning = Tuning {
            start_time: 0.01,
            ..Default::default()
        };
        let mut game = flat_game(tuning);
        let mut sched = RecordingScheduler::default();
        let mut hud = Published::default();
        game.start(&mut sched);
        game.frame(0.0, &mut sched, &mut CountingRenderer::default(), &mut hud);
        game.frame(16.6667, &mut sched, &mut CountingRenderer::default(), &mut hud);

        let statuses: Vec<_> = hud.0.iter().map(|s| s.status).collect();
        assert_eq!(statuses, vec![Status::Play, Status::Dead, Status::Dead]);
    }

    #[test]
    fn test_pause_input_is_one_shot() {
        let mut game = flat_game(Tuning::default());
        let mut sched = RecordingScheduler::default();
        let mut renderer = CountingRenderer::default();
        let mut hud = Published::default();
        game.start(&mut sched);

        game.input.pause = true;
        game.frame(0.0, &mut sched, &mut renderer, &mut hud);
        assert_eq!(game.world.status(), Status::Pause);
        assert!(!game.input.pause);

        game.frame(16.0, &mut sched, &mut renderer, &mut hud);
        assert_eq!(game.world.status(), Status::Pause);
        // paused frames still render and publish
        assert_eq!(renderer.0, 2);
        assert_eq!(hud.0.last().map(|s| s.status), Some(Status::Pause));
    }
}

pub mod lerp;
pub mod scheduler;

/// Linear frame history with rewind/forward. Recording while rewound drops
/// the abandoned future and branches from the current frame.
#[derive(Debug, Clone)]
pub struct TimeMachine<State> {
    states: Vec<State>,
    frame: usize,
}

impl<State> TimeMachine<State> {
    pub fn new(initial_state: State) -> Self {
        Self {
            states: vec![initial_state],
            frame: 0,
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn state(&self) -> &State {
        &self.states[self.frame]
    }

    pub fn history(&self) -> &[State] {
        &self.states
    }

    pub fn rewind(&mut self, frames: usize) -> usize {
        self.frame = self.frame.saturating_sub(frames);
        self.frame
    }

    pub fn forward(&mut self, frames: usize) -> usize {
        let max_frame = self.states.len().saturating_sub(1);
        self.frame = (self.frame + frames).min(max_frame);
        self.frame
    }

    pub fn record(&mut self, state: State) -> usize {
        if self.frame + 1 < self.states.len() {
            self.states.truncate(self.frame + 1);
        }
        self.states.push(state);
        self.frame += 1;
        self.frame
    }
}

/// A pure, frame-stepped game. `step` must not mutate `state`; anything the
/// outside world has to react to goes into `events`.
pub trait GameLogic {
    type State;
    type Input;
    type Event;

    fn initial_state(&self) -> Self::State;
    fn step(
        &self,
        state: &Self::State,
        input: Self::Input,
        events: &mut Vec<Self::Event>,
    ) -> Self::State;
}

/// An event emitted while producing `frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameEvent<E> {
    pub frame: usize,
    pub event: E,
}

#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    timemachine: TimeMachine<G::State>,
    events: Vec<FrameEvent<G::Event>>,
}

impl<G: GameLogic> HeadlessRunner<G> {
    pub fn new(game: G) -> Self {
        let initial_state = game.initial_state();
        Self {
            game,
            timemachine: TimeMachine::new(initial_state),
            events: Vec::new(),
        }
    }

    pub fn frame(&self) -> usize {
        self.timemachine.frame()
    }

    pub fn state(&self) -> &G::State {
        self.timemachine.state()
    }

    pub fn history(&self) -> &[G::State] {
        self.timemachine.history()
    }

    /// Every event recorded on the current branch, oldest first.
    pub fn events(&self) -> &[FrameEvent<G::Event>] {
        &self.events
    }

    pub fn step(&mut self, input: G::Input) -> usize {
        let mut emitted = Vec::new();
        let next_state = self
            .game
            .step(self.timemachine.state(), input, &mut emitted);

        // Branching discards the events of the frames being overwritten.
        let current = self.timemachine.frame();
        self.events.retain(|e| e.frame <= current);

        let frame = self.timemachine.record(next_state);
        self.events
            .extend(emitted.into_iter().map(|event| FrameEvent { frame, event }));
        frame
    }

    pub fn run<I>(&mut self, inputs: I) -> usize
    where
        I: IntoIterator<Item = G::Input>,
    {
        let mut last_frame = self.frame();
        for input in inputs {
            last_frame = self.step(input);
        }
        last_frame
    }

    pub fn rewind(&mut self, frames: usize) -> usize {
        self.timemachine.rewind(frames)
    }

    pub fn forward(&mut self, frames: usize) -> usize {
        self.timemachine.forward(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Additive;

    impl GameLogic for Additive {
        type State = i32;
        type Input = i32;
        type Event = &'static str;

        fn initial_state(&self) -> Self::State {
            0
        }

        fn step(&self, state: &Self::State, input: Self::Input, events: &mut Vec<&'static str>) -> Self::State {
            let next = *state + input;
            if next >= 10 && *state < 10 {
                events.push("crossed ten");
            }
            next
        }
    }

    #[test]
    fn timemachine_rewind_and_branch() {
        let mut tm = TimeMachine::new(0);
        tm.record(1);
        tm.record(2);
        assert_eq!(tm.state(), &2);

        tm.rewind(1);
        assert_eq!(tm.state(), &1);

        tm.record(99);
        assert_eq!(tm.history(), &[0, 1, 99]);
        assert_eq!(tm.frame(), 2);
    }

    #[test]
    fn runner_steps_and_seeks() {
        let mut runner = HeadlessRunner::new(Additive);
        runner.run([1, 2, 3]);
        assert_eq!(runner.frame(), 3);
        assert_eq!(runner.state(), &6);

        runner.rewind(2);
        assert_eq!(runner.state(), &1);

        runner.forward(1);
        assert_eq!(runner.state(), &3);
    }

    #[test]
    fn runner_tags_events_with_their_frame() {
        let mut runner = HeadlessRunner::new(Additive);
        runner.run([4, 4, 4, 4]);

        assert_eq!(
            runner.events(),
            &[FrameEvent {
                frame: 3,
                event: "crossed ten"
            }]
        );
    }

    #[test]
    fn branching_drops_events_from_the_abandoned_future() {
        let mut runner = HeadlessRunner::new(Additive);
        runner.run([5, 5, 5]);
        assert_eq!(runner.events().len(), 1);

        runner.rewind(2);
        runner.step(1);

        assert_eq!(runner.state(), &6);
        assert!(runner.events().is_empty());
        assert_eq!(runner.history(), &[0, 5, 6]);
    }
}

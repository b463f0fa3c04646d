// generation pipeline, one phase action per tick
//
// Scattering -> [AwaitConfirm1] -> Settling -> Selecting -> [AwaitConfirm2]
//   -> Triangulating -> [AwaitConfirm3] -> BuildingGraph -> Done
//
// the confirm phases only exist in interactive runs

use std::marker::PhantomData;

use bevy::prelude::*;

use super::error::{GenerationError, GenerationResult};
use super::graph::{self, Corridor, GraphMst, PetgraphMst};
use super::physics::{RapierWorld, PhysicsWorld, ROOM_MATERIAL};
use super::room::{Room, RoomId};
use super::scatter::Scatterer;
use super::selection;
use super::separation;
use super::triangulation::{SpadeTriangulator, Triangulation, Triangulator};
use super::GenerationParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Scattering,
    AwaitConfirm1,
    Settling,
    Selecting,
    AwaitConfirm2,
    Triangulating,
    AwaitConfirm3,
    BuildingGraph,
    Done,
    // settle ceiling reached, terminal
    Stalled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Stalled)
    }

    pub fn awaits_confirmation(self) -> bool {
        matches!(self, Phase::AwaitConfirm1 | Phase::AwaitConfirm2 | Phase::AwaitConfirm3)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Scattering => "SCATTERING",
            Phase::AwaitConfirm1 | Phase::AwaitConfirm2 | Phase::AwaitConfirm3 => "WAITING",
            Phase::Settling => "SETTLING",
            Phase::Selecting => "SELECTING",
            Phase::Triangulating => "TRIANGULATING",
            Phase::BuildingGraph => "CORRIDORS",
            Phase::Done => "DONE",
            Phase::Stalled => "STALLED",
        }
    }
}

/// The phase that follows `phase` once its exit condition holds.
/// Non-interactive runs skip straight past the confirmation gates.
pub fn next_phase(phase: Phase, interactive: bool) -> Phase {
    let gate = |confirm: Phase, then: Phase| if interactive { confirm } else { then };
    match phase {
        Phase::Scattering => gate(Phase::AwaitConfirm1, Phase::Settling),
        Phase::AwaitConfirm1 => Phase::Settling,
        Phase::Settling => Phase::Selecting,
        Phase::Selecting => gate(Phase::AwaitConfirm2, Phase::Triangulating),
        Phase::AwaitConfirm2 => Phase::Triangulating,
        Phase::Triangulating => gate(Phase::AwaitConfirm3, Phase::BuildingGraph),
        Phase::AwaitConfirm3 => Phase::BuildingGraph,
        Phase::BuildingGraph => Phase::Done,
        Phase::Done => Phase::Done,
        Phase::Stalled => Phase::Stalled,
    }
}

/// Everything one run produces. Fields fill in as phases complete and are never retracted.
#[derive(Clone, Debug)]
pub struct GenerationState {
    pub rooms: Vec<Room>,
    pub selected: Vec<RoomId>,
    pub triangulation: Option<Triangulation>,
    pub spanning_tree: Option<Vec<Corridor>>,
    pub phase: Phase,
    pub settle_ticks: u32,
}

impl GenerationState {
    fn new() -> Self {
        Self {
            rooms: Vec::new(),
            selected: Vec::new(),
            triangulation: None,
            spanning_tree: None,
            phase: Phase::Scattering,
            settle_ticks: 0,
        }
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        // ids are handed out in insertion order
        self.rooms.get(id.0 as usize).filter(|room| room.id == id)
    }

    /// Selected rooms in selection order, the order their centers were triangulated in
    pub fn selected_rooms(&self) -> Vec<&Room> {
        self.selected.iter().filter_map(|&id| self.room(id)).collect()
    }
}

/// Drives one generation run. Owns the run state and the collaborators.
pub struct Generator<W = RapierWorld, T = SpadeTriangulator, G = PetgraphMst> {
    params: GenerationParams,
    scatterer: Scatterer,
    world: W,
    triangulator: T,
    state: GenerationState,
    _graph: PhantomData<G>,
}

pub type DefaultGenerator = Generator<RapierWorld, SpadeTriangulator, PetgraphMst>;

impl DefaultGenerator {
    pub fn new(params: GenerationParams, seed: u64) -> Self {
        let world = RapierWorld::new(params.world_settings());
        Self::with_collaborators(params, seed, world, SpadeTriangulator)
    }
}

impl<W, T, G> Generator<W, T, G>
where
    W: PhysicsWorld,
    T: Triangulator,
    G: GraphMst + Default,
{
    pub fn with_collaborators(params: GenerationParams, seed: u64, world: W, triangulator: T) -> Self {
        Self {
            params,
            scatterer: Scatterer::new(seed),
            world,
            triangulator,
            state: GenerationState::new(),
            _graph: PhantomData,
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The parameters this run was started with
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Adds a room and its physics body. Rooms can only be added while scattering.
    pub fn add_room(&mut self, position: Vec2, width: f32, height: f32) -> Option<RoomId> {
        if self.state.phase != Phase::Scattering {
            warn!("Ignoring room added during {:?}", self.state.phase);
            return None;
        }

        let id = RoomId(self.state.rooms.len() as u32);
        let padding = Vec2::splat(self.params.body_padding);
        let half_extents = (Vec2::new(width, height) + padding) * 0.5;
        let body = self.world.add_box(position, half_extents, ROOM_MATERIAL);
        self.state.rooms.push(Room::new(id, body, position, width, height));
        Some(id)
    }

    /// Closes the scatter phase early, used when the rooms are placed by hand
    pub fn finish_scattering(&mut self) {
        if self.state.phase == Phase::Scattering {
            self.transition(next_phase(Phase::Scattering, self.params.interactive));
        }
    }

    /// Runs exactly one phase action and returns the phase after it.
    /// `confirm` is only consumed by the confirmation gates.
    pub fn tick(&mut self, confirm: bool) -> GenerationResult<Phase> {
        let phase = self.state.phase;
        let done = match phase {
            Phase::Scattering => self.scatter_one(),
            Phase::AwaitConfirm1 | Phase::AwaitConfirm2 | Phase::AwaitConfirm3 => confirm,
            Phase::Settling => self.settle_step()?,
            Phase::Selecting => self.select_step(),
            Phase::Triangulating => {
                self.triangulate();
                true
            }
            Phase::BuildingGraph => {
                self.build_corridors();
                true
            }
            Phase::Done | Phase::Stalled => false,
        };

        if done {
            self.transition(next_phase(phase, self.params.interactive));
        }
        Ok(self.state.phase)
    }

    /// Ticks with confirmation until the run ends
    pub fn run_to_completion(&mut self) -> GenerationResult<&GenerationState> {
        while !self.state.phase.is_terminal() {
            self.tick(true)?;
        }
        Ok(&self.state)
    }

    fn transition(&mut self, next: Phase) {
        info!(
            "{:?} -> {:?} ({} rooms, {} selected, {} corridors)",
            self.state.phase,
            next,
            self.state.rooms.len(),
            self.state.selected.len(),
            self.state.spanning_tree.as_ref().map_or(0, Vec::len),
        );
        self.state.phase = next;
    }

    fn scatter_one(&mut self) -> bool {
        let placement = self.scatterer.next_placement(&self.params);
        self.add_room(placement.position, placement.width, placement.height);
        self.state.rooms.len() > self.params.room_count_threshold
    }

    fn settle_step(&mut self) -> GenerationResult<bool> {
        separation::advance(&mut self.world, &mut self.state.rooms, self.params.physics_timestep);
        self.state.settle_ticks += 1;

        if separation::all_settled(&self.state.rooms) {
            debug!("All rooms asleep after {} ticks", self.state.settle_ticks);
            return Ok(true);
        }

        if let Some(limit) = self.params.max_settle_ticks {
            if self.state.settle_ticks >= limit {
                let awake = self.state.rooms.iter().filter(|room| !room.sleeping).count();
                warn!("Settling gave up after {} ticks with {} rooms still moving", limit, awake);
                self.transition(Phase::Stalled);
                return Err(GenerationError::SettleTimeout { ticks: limit });
            }
        }
        Ok(false)
    }

    fn select_step(&mut self) -> bool {
        let min_area = self.params.min_room_area;
        if self.params.incremental_selection {
            match selection::select_next(&mut self.state.rooms, min_area) {
                Some(id) => {
                    debug!("Selected room {:?}", id);
                    self.state.selected.push(id);
                    false
                }
                None => true,
            }
        } else {
            let picked = selection::select_all(&mut self.state.rooms, min_area);
            self.state.selected.extend(picked);
            true
        }
    }

    fn triangulate(&mut self) {
        let points: Vec<Vec2> = self
            .state
            .selected_rooms()
            .iter()
            .map(|room| room.center())
            .collect();

        let triangulation = self.triangulator.triangulate(&points).unwrap_or_else(|err| {
            warn!("{}, continuing without corridors", err);
            Triangulation::default()
        });
        debug!("{} points -> {} triangles", points.len(), triangulation.triangle_count());
        self.state.triangulation = Some(triangulation);
    }

    fn build_corridors(&mut self) {
        let mut graph = G::default();
        if let Some(triangulation) = &self.state.triangulation {
            graph::build_graph(&mut graph, triangulation, &self.state.selected_rooms());
        }
        self.state.spanning_tree = Some(graph.spanning_tree());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::dungeon::graph::total_weight;
    use crate::systems::dungeon::test_support::{FailingTriangulator, ScriptedWorld};
    use approx::assert_relative_eq;

    type TestGenerator<T = SpadeTriangulator> = Generator<ScriptedWorld, T, PetgraphMst>;

    fn batch_params() -> GenerationParams {
        GenerationParams {
            interactive: false,
            ..default()
        }
    }

    fn three_room_generator(params: GenerationParams) -> TestGenerator {
        let mut generator = TestGenerator::with_collaborators(
            params,
            1,
            ScriptedWorld::already_asleep(),
            SpadeTriangulator,
        );
        for center in [Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), Vec2::new(50.0, 100.0)] {
            generator.add_room(center, 60.0, 64.0);
        }
        generator.finish_scattering();
        generator
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(next_phase(Phase::Scattering, true), Phase::AwaitConfirm1);
        assert_eq!(next_phase(Phase::Scattering, false), Phase::Settling);
        assert_eq!(next_phase(Phase::Selecting, true), Phase::AwaitConfirm2);
        assert_eq!(next_phase(Phase::Selecting, false), Phase::Triangulating);
        assert_eq!(next_phase(Phase::Triangulating, true), Phase::AwaitConfirm3);
        assert_eq!(next_phase(Phase::Triangulating, false), Phase::BuildingGraph);
        assert_eq!(next_phase(Phase::BuildingGraph, true), Phase::Done);
        assert_eq!(next_phase(Phase::Done, true), Phase::Done);
        assert_eq!(next_phase(Phase::Stalled, false), Phase::Stalled);
    }

    #[test]
    fn test_scatter_overshoots_threshold_by_one() {
        let params = GenerationParams {
            room_count_threshold: 5,
            ..batch_params()
        };
        let mut generator = TestGenerator::with_collaborators(params, 9, ScriptedWorld::restless(), SpadeTriangulator);

        for _ in 0..5 {
            assert_eq!(generator.tick(false).unwrap(), Phase::Scattering);
        }
        assert_eq!(generator.tick(false).unwrap(), Phase::Settling);
        assert_eq!(generator.state().rooms.len(), 6);

        // rooms are frozen once scattering is over
        assert_eq!(generator.add_room(Vec2::ZERO, 8.0, 8.0), None);
        assert_eq!(generator.state().rooms.len(), 6);
    }

    #[test]
    fn test_confirmation_gates_hold_until_confirmed() {
        let params = GenerationParams {
            room_count_threshold: 0,
            ..default()
        };
        let mut generator = TestGenerator::with_collaborators(params, 9, ScriptedWorld::staggered(), SpadeTriangulator);

        assert_eq!(generator.tick(false).unwrap(), Phase::AwaitConfirm1);
        for _ in 0..10 {
            assert_eq!(generator.tick(false).unwrap(), Phase::AwaitConfirm1);
        }
        assert_eq!(generator.tick(true).unwrap(), Phase::Settling);
        // a single staggered body sleeps after one step
        assert_eq!(generator.tick(false).unwrap(), Phase::Selecting);
    }

    #[test]
    fn test_every_gate_holds_until_confirmed() {
        let mut generator = three_room_generator(GenerationParams::default());
        assert_eq!(generator.phase(), Phase::AwaitConfirm1);

        for _ in 0..3 {
            assert_eq!(generator.tick(false).unwrap(), Phase::AwaitConfirm1);
        }
        assert_eq!(generator.state().settle_ticks, 0);
        assert_eq!(generator.tick(true).unwrap(), Phase::Settling);
        assert_eq!(generator.tick(false).unwrap(), Phase::Selecting);

        // one room per tick, then the empty pick closes the phase
        for _ in 0..3 {
            assert_eq!(generator.tick(false).unwrap(), Phase::Selecting);
        }
        assert_eq!(generator.tick(false).unwrap(), Phase::AwaitConfirm2);
        for _ in 0..3 {
            assert_eq!(generator.tick(false).unwrap(), Phase::AwaitConfirm2);
            assert!(generator.state().triangulation.is_none());
        }
        assert_eq!(generator.tick(true).unwrap(), Phase::Triangulating);
        assert!(generator.state().triangulation.is_none());

        assert_eq!(generator.tick(false).unwrap(), Phase::AwaitConfirm3);
        for _ in 0..3 {
            assert_eq!(generator.tick(false).unwrap(), Phase::AwaitConfirm3);
            assert!(generator.state().spanning_tree.is_none());
        }
        assert_eq!(generator.state().triangulation.as_ref().unwrap().triangle_count(), 1);
        assert_eq!(generator.tick(true).unwrap(), Phase::BuildingGraph);
        assert!(generator.state().spanning_tree.is_none());

        assert_eq!(generator.tick(false).unwrap(), Phase::Done);
        assert_eq!(generator.state().spanning_tree.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_params_are_fixed_per_run() {
        let params = GenerationParams {
            world_offset: 12.0,
            ..batch_params()
        };
        let generator = TestGenerator::with_collaborators(params, 1, ScriptedWorld::already_asleep(), SpadeTriangulator);
        assert_eq!(generator.params().world_offset, 12.0);
        assert!(!generator.params().interactive);
    }

    #[test]
    fn test_settling_waits_for_every_room() {
        let params = GenerationParams {
            room_count_threshold: 3,
            ..batch_params()
        };
        let mut generator = TestGenerator::with_collaborators(params, 2, ScriptedWorld::staggered(), SpadeTriangulator);
        for _ in 0..4 {
            generator.tick(false).unwrap();
        }
        assert_eq!(generator.phase(), Phase::Settling);

        // the fourth body only sleeps after four steps
        for _ in 0..3 {
            assert_eq!(generator.tick(false).unwrap(), Phase::Settling);
        }
        assert_eq!(generator.tick(false).unwrap(), Phase::Selecting);
        assert_eq!(generator.state().settle_ticks, 4);
    }

    #[test]
    fn test_settle_ceiling_stalls_run() {
        let params = GenerationParams {
            room_count_threshold: 1,
            max_settle_ticks: Some(25),
            ..batch_params()
        };
        let mut generator = TestGenerator::with_collaborators(params, 2, ScriptedWorld::restless(), SpadeTriangulator);

        let err = generator.run_to_completion().unwrap_err();
        assert_eq!(err, GenerationError::SettleTimeout { ticks: 25 });
        assert_eq!(generator.phase(), Phase::Stalled);

        // terminal, further ticks change nothing
        assert_eq!(generator.tick(true).unwrap(), Phase::Stalled);
        assert_eq!(generator.state().settle_ticks, 25);
        assert!(generator.state().triangulation.is_none());
    }

    #[test]
    fn test_three_fixed_rooms_end_to_end() {
        let mut generator = three_room_generator(batch_params());
        let state = generator.run_to_completion().unwrap();

        assert_eq!(state.phase, Phase::Done);
        assert_eq!(state.selected, vec![RoomId(0), RoomId(1), RoomId(2)]);
        assert_eq!(state.triangulation.as_ref().unwrap().triangle_count(), 1);

        let tree = state.spanning_tree.as_ref().unwrap();
        assert_eq!(tree.len(), 2);
        // the 0-1 side is the unique shortest, the other two tie
        assert!(tree.iter().any(|c| {
            (c.from, c.to) == (RoomId(0), RoomId(1)) || (c.from, c.to) == (RoomId(1), RoomId(0))
        }));
        assert_relative_eq!(total_weight(tree), 22500.0);
    }

    #[test]
    fn test_incremental_and_batch_selection_agree() {
        let run = |incremental_selection: bool| {
            let params = GenerationParams {
                incremental_selection,
                ..batch_params()
            };
            let mut generator =
                TestGenerator::with_collaborators(params, 77, ScriptedWorld::already_asleep(), SpadeTriangulator);
            let selected = generator.run_to_completion().unwrap().selected.clone();
            selected
        };

        let stepped = run(true);
        assert_eq!(stepped, run(false));
        assert!(stepped.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_selected_rooms_are_marked_and_large() {
        let mut generator = TestGenerator::with_collaborators(
            batch_params(),
            5,
            ScriptedWorld::already_asleep(),
            SpadeTriangulator,
        );
        let state = generator.run_to_completion().unwrap();
        let min_area = GenerationParams::default().min_room_area;

        for room in &state.rooms {
            assert_eq!(room.selected, state.selected.contains(&room.id));
            assert_eq!(room.selected, room.area() > min_area);
        }
    }

    #[test]
    fn test_no_qualifying_room_yields_empty_tree() {
        let params = GenerationParams {
            min_room_area: f32::MAX,
            ..batch_params()
        };
        let mut generator = TestGenerator::with_collaborators(params, 3, ScriptedWorld::already_asleep(), SpadeTriangulator);
        let state = generator.run_to_completion().unwrap();

        assert!(state.selected.is_empty());
        assert!(state.triangulation.as_ref().unwrap().is_empty());
        assert!(state.spanning_tree.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_single_selected_room_yields_empty_tree() {
        let mut generator = TestGenerator::with_collaborators(
            batch_params(),
            1,
            ScriptedWorld::already_asleep(),
            SpadeTriangulator,
        );
        generator.add_room(Vec2::ZERO, 64.0, 64.0);
        generator.add_room(Vec2::new(200.0, 0.0), 16.0, 16.0);
        generator.finish_scattering();

        let state = generator.run_to_completion().unwrap();
        assert_eq!(state.selected, vec![RoomId(0)]);
        assert!(state.spanning_tree.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_triangulation_failure_falls_back_to_empty() {
        let mut generator = Generator::<ScriptedWorld, FailingTriangulator, PetgraphMst>::with_collaborators(
            batch_params(),
            4,
            ScriptedWorld::already_asleep(),
            FailingTriangulator,
        );
        let state = generator.run_to_completion().unwrap();

        assert_eq!(state.phase, Phase::Done);
        assert!(!state.selected.is_empty());
        assert_eq!(state.triangulation, Some(Triangulation::default()));
        assert!(state.spanning_tree.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_full_run_with_rapier_world() {
        let params = GenerationParams {
            max_settle_ticks: Some(20_000),
            ..batch_params()
        };
        let mut generator = DefaultGenerator::new(params, crate::config::INITIAL_SEED);
        let state = generator.run_to_completion().unwrap();

        assert_eq!(state.rooms.len(), crate::config::ROOM_COUNT_THRESHOLD + 1);
        assert!(state.rooms.iter().all(|room| room.sleeping));

        // separated rooms overlap by at most the solver slop
        for (i, a) in state.rooms.iter().enumerate() {
            for b in &state.rooms[i + 1..] {
                let overlap = (a.half_extents() + b.half_extents()) - (a.position - b.position).abs();
                assert!(overlap.min_element() < 1.0, "{:?} overlaps {:?}", a.id, b.id);
            }
        }

        // a connected triangulation gives a tree touching every main room
        let tree = state.spanning_tree.as_ref().unwrap();
        if state.selected.len() >= 3 {
            assert_eq!(tree.len(), state.selected.len() - 1);
        }
        for corridor in tree {
            assert!(state.selected.contains(&corridor.from));
            assert!(state.selected.contains(&corridor.to));
        }
    }
}

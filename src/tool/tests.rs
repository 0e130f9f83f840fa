//! Unit tests for tool registration, selection and input routing.

use std::cell::RefCell;

use bevy::prelude::*;

use super::*;
use crate::map::{FogSurface, MapImage, MapState};
use crate::transform::Viewport;

thread_local! {
    static LIFECYCLE: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn lifecycle() -> Vec<String> {
    LIFECYCLE.with(|log| log.borrow().clone())
}

fn clear_lifecycle() {
    LIFECYCLE.with(|log| log.borrow_mut().clear());
}

/// Local state that logs when it is created and dropped
struct Tracked(&'static str);

impl Tracked {
    fn new(id: &'static str) -> Self {
        LIFECYCLE.with(|log| log.borrow_mut().push(format!("create {}", id)));
        Self(id)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        LIFECYCLE.with(|log| log.borrow_mut().push(format!("drop {}", self.0)));
    }
}

fn tracked_tool(id: &'static str, create: fn() -> Tracked) -> ToolDescriptor<Tracked, ()> {
    ToolDescriptor::new(id, create)
}

/// Local state of the recording tool
type Calls = Vec<&'static str>;

fn record_down(_: &PointerEvent, _: &mut MapToolContext<'_>, calls: &mut LocalState<Calls>, _: &()) {
    calls.push("down");
}

fn record_move(_: &PointerEvent, _: &mut MapToolContext<'_>, calls: &mut LocalState<Calls>, _: &()) {
    calls.push("move");
}

fn record_up(_: &PointerEvent, _: &mut MapToolContext<'_>, calls: &mut LocalState<Calls>, _: &()) {
    calls.push("up");
}

fn record_click(_: &PointerEvent, _: &mut MapToolContext<'_>, calls: &mut LocalState<Calls>, _: &()) {
    calls.push("click");
}

fn record_drag(
    _: &DragEvent,
    _: &mut MapToolContext<'_>,
    calls: &mut LocalState<Calls>,
    _: &(),
) -> DragResponse {
    calls.push("drag");
    DragResponse::Continue
}

fn recorder(id: &'static str) -> ToolDescriptor<Calls, ()> {
    ToolDescriptor::new(id, Vec::new)
        .on_pointer_down(record_down)
        .on_pointer_move(record_move)
        .on_pointer_up(record_up)
        .on_click(record_click)
        .on_drag(record_drag)
}

fn take_lock(_: &PointerEvent, ctx: &mut MapToolContext<'_>, _: &mut LocalState<()>, _: &()) {
    ctx.drag_lock.deny();
}

fn release_lock(_: &PointerEvent, ctx: &mut MapToolContext<'_>, _: &mut LocalState<()>, _: &()) {
    ctx.drag_lock.allow();
}

fn exclusive_drag(id: &'static str) -> ToolDescriptor<(), ()> {
    ToolDescriptor::new(id, || ())
        .on_pointer_down(take_lock)
        .on_pointer_up(release_lock)
}

fn explode(_: &PointerEvent, ctx: &mut MapToolContext<'_>, _: &mut LocalState<()>, _: &()) {
    ctx.drag_lock.deny();
    panic!("brush exploded");
}

fn faulty(id: &'static str) -> ToolDescriptor<(), ()> {
    ToolDescriptor::new(id, || ()).on_pointer_down(explode)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Stamp {
    size: u32,
}

fn stamp_click(_: &PointerEvent, _: &mut MapToolContext<'_>, sizes: &mut LocalState<Vec<u32>>, stamp: &Stamp) {
    sizes.push(stamp.size);
}

struct Host {
    image: MapImage,
    fog: FogSurface,
    map_state: MapState,
    viewport: Viewport,
    drag_lock: DragLock,
    states: ToolContextStates,
    dispatcher: ToolDispatcher,
}

impl Host {
    fn new() -> Self {
        Self {
            image: MapImage::new(Handle::default(), UVec2::new(1000, 800)),
            fog: FogSurface::new(UVec2::new(1000, 800), Handle::default()),
            map_state: MapState::default(),
            viewport: Viewport::new(Vec2::new(500.0, 400.0)),
            drag_lock: DragLock::default(),
            states: ToolContextStates::default(),
            dispatcher: ToolDispatcher::default(),
        }
    }

    fn register<L, C>(&mut self, descriptor: ToolDescriptor<L, C>)
    where
        L: Send + Sync + 'static,
        C: Default + Send + Sync + 'static,
    {
        self.dispatcher
            .register(descriptor, &mut self.states)
            .unwrap();
    }

    fn select(&mut self, id: &str) -> Option<ToolTransition> {
        self.dispatcher.select(id, &mut self.drag_lock).unwrap()
    }

    fn send(&mut self, input: ToolInput) -> DispatchOutcome {
        let mut ctx = MapToolContext::new(
            &self.image,
            &mut self.fog,
            &mut self.map_state,
            &self.viewport,
            &mut self.drag_lock,
            false,
            Vec3::ZERO,
        );
        self.dispatcher.dispatch(&input, &mut ctx, &self.states)
    }

    fn calls(&self) -> Calls {
        self.dispatcher
            .active_local_state::<Calls>()
            .cloned()
            .unwrap_or_default()
    }
}

fn pointer() -> PointerEvent {
    PointerEvent {
        canvas: Vec2::ZERO,
        scene: Vec3::ZERO,
        button: MouseButton::Left,
    }
}

fn down() -> ToolInput {
    ToolInput::PointerDown(pointer())
}

fn moved() -> ToolInput {
    ToolInput::PointerMove(pointer())
}

fn up() -> ToolInput {
    ToolInput::PointerUp(pointer())
}

fn click() -> ToolInput {
    ToolInput::Click(pointer())
}

fn drag(phase: DragPhase) -> ToolInput {
    ToolInput::Drag(DragEvent {
        phase,
        canvas: Vec2::new(5.0, 0.0),
        scene: Vec3::ZERO,
        delta: Vec2::new(5.0, 0.0),
        movement: Vec2::new(5.0, 0.0),
        button: MouseButton::Left,
    })
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_register_rejects_duplicate_id() {
    let mut host = Host::new();
    host.register(recorder("a"));

    let result = host.dispatcher.register(recorder("a"), &mut host.states);
    assert_eq!(result, Err(ToolError::DuplicateId("a")));
    assert_eq!(host.dispatcher.tools().count(), 1);
}

#[test]
fn test_tools_listed_in_registration_order() {
    let mut host = Host::new();
    host.register(recorder("b"));
    host.register(recorder("a").with_label("Alpha").with_shortcut(KeyCode::KeyA));

    let tools: Vec<ToolInfo> = host.dispatcher.tools().collect();
    assert_eq!(tools[0].id, "b");
    assert_eq!(tools[0].label, "b");
    assert_eq!(tools[1].label, "Alpha");
    assert_eq!(tools[1].shortcut, Some(KeyCode::KeyA));
}

#[test]
fn test_register_creates_default_context_state() {
    let mut host = Host::new();
    host.register(ToolDescriptor::<Vec<u32>, Stamp>::new("stamp", Vec::new));
    assert_eq!(host.states.get::<Stamp>("stamp"), Some(&Stamp::default()));
}

#[test]
fn test_select_unknown_tool() {
    let mut host = Host::new();
    let result = host.dispatcher.select("nope", &mut host.drag_lock);
    assert_eq!(result, Err(ToolError::UnknownTool("nope".to_string())));
    assert_eq!(host.dispatcher.active_id(), None);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_at_most_one_tool_active() {
    let mut host = Host::new();
    host.register(recorder("a"));
    host.register(recorder("b"));
    assert_eq!(host.dispatcher.active_id(), None);

    for id in ["a", "b", "a", "b", "b"] {
        host.select(id);
        let active: Vec<&str> = host
            .dispatcher
            .tools()
            .filter(|tool| host.dispatcher.is_active(tool.id))
            .map(|tool| tool.id)
            .collect();
        assert_eq!(active, vec![id]);
    }
}

#[test]
fn test_new_local_state_created_before_old_is_dropped() {
    clear_lifecycle();
    let mut host = Host::new();
    host.register(tracked_tool("a", || Tracked::new("a")));
    host.register(tracked_tool("b", || Tracked::new("b")));

    host.select("a");
    host.select("b");

    assert_eq!(lifecycle(), vec!["create a", "create b", "drop a"]);
}

#[test]
fn test_reselecting_active_tool_keeps_local_state() {
    clear_lifecycle();
    let mut host = Host::new();
    host.register(tracked_tool("a", || Tracked::new("a")));

    assert!(host.select("a").is_some());
    assert!(host.select("a").is_none());
    assert_eq!(lifecycle(), vec!["create a"]);
}

#[test]
fn test_reactivation_starts_with_fresh_local_state() {
    let mut host = Host::new();
    host.register(recorder("a"));
    host.register(recorder("b"));

    host.select("a");
    host.send(click());
    assert_eq!(host.calls(), vec!["click"]);

    host.select("b");
    host.select("a");
    assert!(host.calls().is_empty());
}

#[test]
fn test_deactivate_drops_local_state() {
    clear_lifecycle();
    let mut host = Host::new();
    host.register(tracked_tool("a", || Tracked::new("a")));
    host.select("a");

    let transition = host.dispatcher.deactivate(&mut host.drag_lock);
    assert_eq!(
        transition,
        Some(ToolTransition {
            from: Some("a"),
            to: None,
            drag_lock_leaked: false,
        })
    );
    assert_eq!(host.dispatcher.active_id(), None);
    assert_eq!(lifecycle(), vec!["create a", "drop a"]);
    assert_eq!(host.send(click()), DispatchOutcome::NoActiveTool);
}

// ============================================================================
// Event routing
// ============================================================================

#[test]
fn test_events_delivered_in_order() {
    let mut host = Host::new();
    host.register(recorder("a"));
    host.select("a");

    host.send(down());
    for _ in 0..3 {
        host.send(moved());
    }
    host.send(up());

    assert_eq!(host.calls(), vec!["down", "move", "move", "move", "up"]);
}

#[test]
fn test_click_and_pointer_up_both_fire() {
    let mut host = Host::new();
    host.register(recorder("a"));
    host.select("a");

    host.send(down());
    host.send(up());
    host.send(click());

    assert_eq!(host.calls(), vec!["down", "up", "click"]);
}

#[test]
fn test_inactive_tool_receives_nothing() {
    let mut host = Host::new();
    host.register(recorder("a"));
    host.register(recorder("b"));
    host.select("a");
    host.send(down());

    host.select("b");
    host.send(moved());
    host.send(up());
    assert_eq!(host.calls(), vec!["move", "up"]);

    // Back on `a`, nothing from while `b` was active shows up
    host.select("a");
    assert!(host.calls().is_empty());
}

#[test]
fn test_missing_handler_is_ignored() {
    let mut host = Host::new();
    host.register(exclusive_drag("lock"));
    host.select("lock");

    assert_eq!(host.send(click()), DispatchOutcome::Ignored);
    assert_eq!(host.send(drag(DragPhase::Start)), DispatchOutcome::Ignored);
    assert_eq!(host.send(down()), DispatchOutcome::Delivered);
}

#[test]
fn test_drag_response_is_reported() {
    let mut host = Host::new();
    host.register(recorder("a"));
    host.select("a");

    let outcome = host.send(drag(DragPhase::Move));
    assert_eq!(outcome, DispatchOutcome::Drag(DragResponse::Continue));
    assert!(!outcome.drag_handled());
}

#[test]
fn test_no_active_tool() {
    let mut host = Host::new();
    host.register(recorder("a"));
    assert_eq!(host.send(down()), DispatchOutcome::NoActiveTool);
}

#[test]
fn test_context_state_changes_are_seen_by_handlers() {
    let mut host = Host::new();
    host.register(ToolDescriptor::<Vec<u32>, Stamp>::new("stamp", Vec::new).on_click(stamp_click));
    host.select("stamp");

    host.send(click());
    host.states.set("stamp", Stamp { size: 3 }).unwrap();
    host.send(click());

    assert_eq!(
        host.dispatcher.active_local_state::<Vec<u32>>(),
        Some(&vec![0, 3])
    );
}

// ============================================================================
// Drag lock
// ============================================================================

#[test]
fn test_tool_that_never_locks_leaves_panning_alone() {
    let mut host = Host::new();
    host.register(recorder("a"));
    host.select("a");

    host.send(down());
    assert!(host.drag_lock.is_allowed());
    host.send(drag(DragPhase::Start));
    assert!(host.drag_lock.is_allowed());
    host.send(up());
    assert!(host.drag_lock.is_allowed());
}

#[test]
fn test_exclusive_drag_restores_lock_on_pointer_up() {
    let mut host = Host::new();
    host.register(exclusive_drag("lock"));
    host.select("lock");

    host.send(down());
    assert!(!host.drag_lock.is_allowed());
    host.send(up());
    assert!(host.drag_lock.is_allowed());
}

#[test]
fn test_switching_tools_mid_drag_releases_lock() {
    let mut host = Host::new();
    host.register(exclusive_drag("draw-fog"));
    host.register(recorder("measure"));
    host.select("draw-fog");

    host.send(down());
    host.send(drag(DragPhase::Start));
    assert!(!host.drag_lock.is_allowed());

    let transition = host.select("measure");
    assert!(host.drag_lock.is_allowed());
    assert_eq!(
        transition,
        Some(ToolTransition {
            from: Some("draw-fog"),
            to: Some("measure"),
            drag_lock_leaked: true,
        })
    );
    // No synthetic pointer-up reaches either tool
    assert!(host.calls().is_empty());
}

// ============================================================================
// Faults
// ============================================================================

#[test]
fn test_handler_panic_is_contained() {
    let mut host = Host::new();
    host.register(faulty("boom"));
    host.select("boom");

    assert_eq!(host.send(down()), DispatchOutcome::Faulted);
    assert!(host.drag_lock.is_allowed());
    assert_eq!(host.dispatcher.active_id(), Some("boom"));
    assert_eq!(
        host.dispatcher.last_fault(),
        Some(&ToolError::HandlerPanicked {
            id: "boom",
            handler: "on_pointer_down",
            message: "brush exploded".to_string(),
        })
    );
}

#[test]
fn test_repeated_faults_fall_back_to_default_tool() {
    let mut host = Host::new();
    host.register(recorder("pan"));
    host.register(faulty("boom"));
    host.dispatcher.set_fallback("pan");
    host.dispatcher.set_max_consecutive_faults(2);
    host.select("boom");

    host.send(down());
    assert_eq!(host.dispatcher.active_id(), Some("boom"));
    host.send(down());
    assert_eq!(host.dispatcher.active_id(), Some("pan"));

    host.send(click());
    assert_eq!(host.calls(), vec!["click"]);
}

#[test]
fn test_successful_call_resets_fault_count() {
    let mut host = Host::new();
    host.register(recorder("pan"));
    host.register(faulty("boom").on_click(|_, _, _, _| {}));
    host.dispatcher.set_fallback("pan");
    host.dispatcher.set_max_consecutive_faults(2);
    host.select("boom");

    host.send(down());
    host.send(click());
    host.send(down());
    assert_eq!(host.dispatcher.active_id(), Some("boom"));
}

#[test]
fn test_faulting_fallback_stays_selected() {
    let mut host = Host::new();
    host.register(faulty("pan"));
    host.dispatcher.set_fallback("pan");
    host.dispatcher.set_max_consecutive_faults(1);
    host.select("pan");

    host.send(down());
    host.send(down());
    assert_eq!(host.dispatcher.active_id(), Some("pan"));
}

// ============================================================================
// App wiring
// ============================================================================

#[test]
fn test_add_map_tool_registers_on_app() {
    let mut app = App::new();
    app.add_map_tool(recorder("a"))
        .add_map_tool(ToolDescriptor::<Vec<u32>, Stamp>::new("stamp", Vec::new))
        .add_map_tool(recorder("a"));

    let dispatcher = app.world().resource::<ToolDispatcher>();
    let ids: Vec<&str> = dispatcher.tools().map(|tool| tool.id).collect();
    assert_eq!(ids, vec!["a", "stamp"]);
    assert!(app.world().resource::<ToolContextStates>().contains("stamp"));
}

fn claim_drag(_: &DragEvent, _: &mut MapToolContext<'_>, _: &mut LocalState<()>, _: &()) -> DragResponse {
    DragResponse::Handled
}

fn routing_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .init_resource::<DragLock>()
        .init_resource::<ModifierState>()
        .init_resource::<MapState>()
        .init_resource::<crate::map::PointerPosition>()
        .insert_resource(Viewport::new(Vec2::new(500.0, 400.0)))
        .insert_resource(MapImage::new(Handle::default(), UVec2::new(1000, 800)))
        .insert_resource(FogSurface::new(UVec2::new(1000, 800), Handle::default()))
        .add_message::<ToolInput>()
        .add_map_tool(ToolDescriptor::<(), ()>::new("pan", || ()))
        .add_map_tool(ToolDescriptor::<(), ()>::new("ruler", || ()).on_drag(claim_drag))
        .add_map_tool(exclusive_drag("brush"))
        .add_map_tool(recorder("recorder"))
        .add_systems(Update, super::systems::route_tool_input);
    app
}

fn select_in(app: &mut App, id: &str) {
    app.world_mut()
        .resource_scope(|world, mut dispatcher: Mut<ToolDispatcher>| {
            let mut lock = world.resource_mut::<DragLock>();
            dispatcher.select(id, &mut lock).unwrap();
        });
}

fn drag_once(app: &mut App) -> Vec3 {
    app.world_mut().write_message(down());
    app.world_mut().write_message(drag(DragPhase::Start));
    app.world_mut().write_message(up());
    app.update();
    app.world().resource::<MapState>().target().position
}

#[test]
fn test_unclaimed_drag_pans_map() {
    let mut app = routing_app();
    select_in(&mut app, "pan");

    // Canvas +5 px in x is +5 scene units in x at pixel ratio 1
    assert_eq!(drag_once(&mut app), Vec3::new(5.0, 0.0, 0.0));
    // Panning animates; the current placement has not jumped
    assert_eq!(app.world().resource::<MapState>().position(), Vec3::ZERO);
}

#[test]
fn test_handled_drag_does_not_pan() {
    let mut app = routing_app();
    select_in(&mut app, "ruler");
    assert_eq!(drag_once(&mut app), Vec3::ZERO);
}

#[test]
fn test_locked_drag_does_not_pan() {
    let mut app = routing_app();
    select_in(&mut app, "brush");
    assert_eq!(drag_once(&mut app), Vec3::ZERO);
    assert!(app.world().resource::<DragLock>().is_allowed());
}

#[derive(Resource, Default)]
struct DispatcherChanges(Vec<bool>);

fn record_dispatcher_changes(dispatcher: Res<ToolDispatcher>, mut changes: ResMut<DispatcherChanges>) {
    changes.0.push(dispatcher.is_changed());
}

#[test]
fn test_routing_local_state_is_not_a_change() {
    let mut app = routing_app();
    app.init_resource::<DispatcherChanges>().add_systems(
        Update,
        record_dispatcher_changes.after(super::systems::route_tool_input),
    );
    select_in(&mut app, "recorder");
    app.update();

    // The recorder writes its local state on every routed event
    drag_once(&mut app);
    drag_once(&mut app);

    let changes = &app.world().resource::<DispatcherChanges>().0;
    assert_eq!(changes.len(), 3);
    assert!(!changes[1]);
    assert!(!changes[2]);
}

#[derive(Resource, Default)]
struct HostChanges {
    map_state: Vec<bool>,
    fog: Vec<bool>,
    drag_lock: Vec<bool>,
}

fn record_host_changes(
    map_state: Res<MapState>,
    fog: Res<FogSurface>,
    drag_lock: Res<DragLock>,
    mut changes: ResMut<HostChanges>,
) {
    changes.map_state.push(map_state.is_changed());
    changes.fog.push(fog.is_changed());
    changes.drag_lock.push(drag_lock.is_changed());
}

fn render_active_tool(
    dispatcher: Res<ToolDispatcher>,
    context_states: Res<ToolContextStates>,
    params: MapToolViewParams,
) {
    let view = params.view();
    dispatcher.render(&view, &context_states);
}

#[test]
fn test_idle_frames_leave_host_state_unchanged() {
    let mut app = routing_app();
    app.init_resource::<HostChanges>().add_systems(
        Update,
        (render_active_tool, record_host_changes)
            .chain()
            .after(super::systems::route_tool_input),
    );
    select_in(&mut app, "pan");
    app.update();
    app.update();

    // Hovering reaches the pan tool but changes nothing
    app.world_mut().write_message(moved());
    app.update();

    app.world_mut().write_message(drag(DragPhase::Start));
    app.update();

    let changes = app.world().resource::<HostChanges>();
    assert_eq!(changes.map_state, vec![true, false, false, true]);
    assert_eq!(changes.fog, vec![true, false, false, false]);
    assert_eq!(changes.drag_lock, vec![true, false, false, false]);
}

#[test]
fn test_lock_taken_by_tool_is_a_change() {
    let mut app = routing_app();
    app.init_resource::<HostChanges>().add_systems(
        Update,
        record_host_changes.after(super::systems::route_tool_input),
    );
    select_in(&mut app, "brush");
    app.update();

    app.world_mut().write_message(down());
    app.update();

    let changes = app.world().resource::<HostChanges>();
    assert_eq!(changes.drag_lock, vec![true, true]);
    assert_eq!(changes.map_state, vec![true, false]);
    assert!(!app.world().resource::<DragLock>().is_allowed());
}

#[test]
fn test_input_queued_before_tool_switch_is_dropped() {
    let mut app = routing_app();
    app.init_resource::<GestureTracker>()
        .add_message::<SelectToolRequest>()
        .add_systems(
            Update,
            super::systems::handle_select_tool_requests.before(super::systems::route_tool_input),
        );
    select_in(&mut app, "pan");
    app.update();

    // A drag from the pan tool's gesture and a switch land in the same frame
    app.world_mut().write_message(drag(DragPhase::Move));
    app.world_mut().write_message(SelectToolRequest::new("recorder"));
    app.update();

    let dispatcher = app.world().resource::<ToolDispatcher>();
    assert_eq!(dispatcher.active_id(), Some("recorder"));
    assert_eq!(dispatcher.active_local_state::<Calls>(), Some(&Vec::new()));
    assert_eq!(app.world().resource::<MapState>().target().position, Vec3::ZERO);

    // Input after the switch is delivered as usual
    app.world_mut().write_message(down());
    app.update();
    let dispatcher = app.world().resource::<ToolDispatcher>();
    assert_eq!(dispatcher.active_local_state::<Calls>(), Some(&vec!["down"]));
}

#[test]
fn test_unmount_deactivates_and_resets_interaction() {
    let mut app = routing_app();
    app.init_resource::<GestureTracker>()
        .add_message::<UnmountMapView>()
        .add_systems(
            Update,
            super::systems::handle_unmount.before(super::systems::route_tool_input),
        );
    select_in(&mut app, "brush");
    app.world_mut().resource_mut::<DragLock>().deny();
    app.world_mut()
        .resource_mut::<GestureTracker>()
        .press(MouseButton::Left, Vec2::ZERO, Vec3::ZERO);

    app.world_mut().write_message(UnmountMapView);
    app.update();

    assert_eq!(app.world().resource::<ToolDispatcher>().active_id(), None);
    assert!(app.world().resource::<DragLock>().is_allowed());
    assert!(!app.world().resource::<GestureTracker>().is_pressed());
}

fn default_tool_app(default_tool: &str) -> App {
    let mut config = crate::config::MapToolsConfig::new(std::env::temp_dir().join("map-tools-unused.json"));
    config.data.default_tool = default_tool.to_string();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(config)
        .init_resource::<DragLock>()
        .add_map_tool(ToolDescriptor::<(), ()>::new(crate::constants::DEFAULT_TOOL_ID, || ()))
        .add_map_tool(recorder("recorder"))
        .add_systems(Startup, super::systems::select_default_tool);
    app
}

#[test]
fn test_configured_default_tool_is_selected() {
    let mut app = default_tool_app("recorder");
    app.update();

    let dispatcher = app.world().resource::<ToolDispatcher>();
    assert_eq!(dispatcher.active_id(), Some("recorder"));
    assert_eq!(dispatcher.fallback(), Some("recorder"));
}

#[test]
fn test_unknown_default_tool_falls_back_to_neutral_tool() {
    let mut app = default_tool_app("lasso");
    app.update();

    let dispatcher = app.world().resource::<ToolDispatcher>();
    assert_eq!(dispatcher.active_id(), Some(crate::constants::DEFAULT_TOOL_ID));
    assert_eq!(dispatcher.fallback(), Some(crate::constants::DEFAULT_TOOL_ID));
}

// ============================================================================
// Pointer collection
// ============================================================================

#[derive(Resource, Default)]
struct CollectedInput(Vec<ToolInput>);

fn record_tool_input(mut inputs: MessageReader<ToolInput>, mut collected: ResMut<CollectedInput>) {
    collected.0.extend(inputs.read().copied());
}

fn pointer_app() -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Viewport::new(Vec2::new(500.0, 400.0)).with_pixel_ratio(2.0))
        .insert_resource(MapImage::new(Handle::default(), UVec2::new(1000, 800)))
        .init_resource::<MapState>()
        .init_resource::<GestureTracker>()
        .init_resource::<crate::map::PointerPosition>()
        .init_resource::<CollectedInput>()
        .add_message::<bevy::window::WindowEvent>()
        .add_message::<ToolInput>()
        .add_systems(
            Update,
            (super::systems::collect_pointer_input, record_tool_input).chain(),
        );
    let window = app
        .world_mut()
        .spawn((Window::default(), bevy::window::PrimaryWindow))
        .id();
    (app, window)
}

fn cursor_moved(window: Entity, position: Vec2) -> bevy::window::WindowEvent {
    bevy::window::WindowEvent::CursorMoved(bevy::window::CursorMoved {
        window,
        position,
        delta: None,
    })
}

fn mouse_button(window: Entity, state: bevy::input::ButtonState) -> bevy::window::WindowEvent {
    bevy::window::WindowEvent::MouseButtonInput(bevy::input::mouse::MouseButtonInput {
        button: MouseButton::Left,
        state,
        window,
    })
}

#[test]
fn test_window_events_become_ordered_tool_input() {
    use bevy::input::ButtonState;

    let (mut app, window) = pointer_app();
    let other_window = app.world_mut().spawn_empty().id();
    for event in [
        cursor_moved(window, Vec2::new(10.0, 20.0)),
        mouse_button(window, ButtonState::Pressed),
        cursor_moved(other_window, Vec2::new(200.0, 200.0)),
        cursor_moved(window, Vec2::new(30.0, 20.0)),
        mouse_button(window, ButtonState::Released),
    ] {
        app.world_mut().write_message(event);
    }
    app.update();

    let collected = &app.world().resource::<CollectedInput>().0;
    let names: Vec<&str> = collected.iter().map(ToolInput::handler_name).collect();
    assert_eq!(
        names,
        vec![
            "on_pointer_move",
            "on_pointer_down",
            "on_pointer_move",
            "on_drag",
            "on_drag",
            "on_pointer_up",
        ]
    );

    // Canvas space is physical pixels
    let ToolInput::PointerMove(first) = collected[0] else {
        panic!("expected a pointer move, got {:?}", collected[0]);
    };
    assert_eq!(first.canvas, Vec2::new(20.0, 40.0));
    let ToolInput::Drag(last_drag) = collected[4] else {
        panic!("expected a drag, got {:?}", collected[4]);
    };
    assert_eq!(last_drag.phase, DragPhase::End);
    assert_eq!(last_drag.movement, Vec2::new(40.0, 0.0));
    assert!(app.world().resource::<crate::map::PointerPosition>().is_inside());
}

#[test]
fn test_button_before_any_cursor_position_is_skipped() {
    let (mut app, window) = pointer_app();
    app.world_mut()
        .write_message(mouse_button(window, bevy::input::ButtonState::Pressed));
    app.update();

    assert!(app.world().resource::<CollectedInput>().0.is_empty());
    assert!(!app.world().resource::<GestureTracker>().is_pressed());
}

//! Pointer interaction: drag, pick, context menu and scale dialog

use wall_physics::{BodyHandle, PhysicsWorld, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down(PointerButton),
    Move,
    Up(PointerButton),
}

/// Pointer event in canvas coordinates, with the screen position it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
    pub screen: Point,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, position: Point) -> Self {
        Self {
            kind,
            position,
            screen: position,
        }
    }

    pub fn with_screen(mut self, screen: Point) -> Self {
        self.screen = screen;
        self
    }
}

/// Context menu scoped to one body
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub body: BodyHandle,
    /// Screen position of the opening gesture
    pub screen: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Rotate,
    Scale,
}

/// Pending scale input for one body
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleEdit {
    pub body: BodyHandle,
    pub input: String,
}

pub const DEFAULT_SCALE_INPUT: &str = "1";

impl ScaleEdit {
    pub fn new(body: BodyHandle) -> Self {
        Self {
            body,
            input: DEFAULT_SCALE_INPUT.to_string(),
        }
    }

    /// Parsed input, `None` when it is not a number
    pub fn value(&self) -> Option<f32> {
        self.input.trim().parse::<f32>().ok().filter(|v| v.is_finite())
    }
}

/// Transient pointer state: at most one menu and one scale dialog
#[derive(Debug, Default)]
pub struct InteractionController {
    menu: Option<ContextMenu>,
    scale_edit: Option<ScaleEdit>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// First non-static body whose bounds contain `point`
    pub fn pick(world: &PhysicsWorld, point: Point) -> Option<BodyHandle> {
        world.query().first_dynamic_at(point).map(|hit| hit.body)
    }

    /// Route a pointer event. Primary press dismisses the menu and grabs the
    /// body under the pointer; secondary press opens a menu on a hit body.
    pub fn handle_pointer(&mut self, world: &mut PhysicsWorld, event: PointerEvent) {
        match event.kind {
            PointerKind::Down(PointerButton::Primary) => {
                self.menu = None;
                if let Some(body) = Self::pick(world, event.position) {
                    if world.begin_drag(body, event.position).is_ok() {
                        log::trace!("Drag start on {:?}", body);
                    }
                }
            }
            PointerKind::Down(PointerButton::Secondary) => {
                if let Some(body) = Self::pick(world, event.position) {
                    self.menu = Some(ContextMenu {
                        body,
                        screen: event.screen,
                    });
                }
            }
            PointerKind::Move => world.drag_to(event.position),
            PointerKind::Up(PointerButton::Primary) => world.end_drag(),
            PointerKind::Up(PointerButton::Secondary) => {}
        }
    }

    pub fn menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    /// Close the menu, returning what it was scoped to
    pub fn take_menu(&mut self) -> Option<ContextMenu> {
        self.menu.take()
    }

    pub fn scale_edit(&self) -> Option<&ScaleEdit> {
        self.scale_edit.as_ref()
    }

    pub fn open_scale_edit(&mut self, body: BodyHandle) {
        self.scale_edit = Some(ScaleEdit::new(body));
    }

    pub fn set_scale_input(&mut self, input: impl Into<String>) {
        if let Some(edit) = &mut self.scale_edit {
            edit.input = input.into();
        }
    }

    pub fn close_scale_edit(&mut self) -> Option<ScaleEdit> {
        self.scale_edit.take()
    }

    /// Drop any state that points at `body`
    pub fn forget(&mut self, body: BodyHandle) {
        if self.menu.as_ref().is_some_and(|m| m.body == body) {
            self.menu = None;
        }
        if self.scale_edit.as_ref().is_some_and(|e| e.body == body) {
            self.scale_edit = None;
        }
    }

    pub fn reset(&mut self) {
        self.menu = None;
        self.scale_edit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wall_physics::{BodyDesc, BodyShape, PhysicsConfig};

    fn world_with_box() -> (PhysicsWorld, BodyHandle) {
        let mut world = PhysicsWorld::new(PhysicsConfig::default().with_gravity(0.0, 0.0));
        let body = world
            .create_body(BodyDesc::dynamic(BodyShape::rectangle(40.0, 40.0)).with_position(50.0, 50.0))
            .unwrap();
        (world, body)
    }

    #[test]
    fn test_secondary_press_opens_menu_on_hit_only() {
        let (mut world, body) = world_with_box();
        let mut controller = InteractionController::new();

        let miss = PointerEvent::new(PointerKind::Down(PointerButton::Secondary), [300.0, 300.0]);
        controller.handle_pointer(&mut world, miss);
        assert!(controller.menu().is_none());

        let hit = PointerEvent::new(PointerKind::Down(PointerButton::Secondary), [50.0, 50.0])
            .with_screen([450.0, 250.0]);
        controller.handle_pointer(&mut world, hit);
        let menu = controller.menu().unwrap();
        assert_eq!(menu.body, body);
        assert_eq!(menu.screen, [450.0, 250.0]);

        let click = PointerEvent::new(PointerKind::Down(PointerButton::Primary), [500.0, 10.0]);
        controller.handle_pointer(&mut world, click);
        assert!(controller.menu().is_none());
    }

    #[test]
    fn test_primary_drag_grabs_and_releases() {
        let (mut world, body) = world_with_box();
        let mut controller = InteractionController::new();

        controller.handle_pointer(&mut world, PointerEvent::new(PointerKind::Down(PointerButton::Primary), [55.0, 45.0]));
        assert_eq!(world.dragged_body(), Some(body));

        controller.handle_pointer(&mut world, PointerEvent::new(PointerKind::Move, [90.0, 45.0]));
        controller.handle_pointer(&mut world, PointerEvent::new(PointerKind::Up(PointerButton::Primary), [90.0, 45.0]));
        assert_eq!(world.dragged_body(), None);
    }

    #[test]
    fn test_scale_input_parsing() {
        let (_, body) = world_with_box();
        let mut edit = ScaleEdit::new(body);
        assert_eq!(edit.value(), Some(1.0));
        edit.input = " 2.5 ".into();
        assert_eq!(edit.value(), Some(2.5));
        edit.input = "big".into();
        assert_eq!(edit.value(), None);
    }

    #[test]
    fn test_forget_drops_state_for_removed_body() {
        let (mut world, body) = world_with_box();
        let mut controller = InteractionController::new();
        controller.handle_pointer(
            &mut world,
            PointerEvent::new(PointerKind::Down(PointerButton::Secondary), [50.0, 50.0]),
        );
        controller.open_scale_edit(body);

        controller.forget(body);
        assert!(controller.menu().is_none());
        assert!(controller.scale_edit().is_none());
    }
}

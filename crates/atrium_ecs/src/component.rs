//! Component variants
//!
//! Components are immutable values. Every mutator borrows `self` and returns a
//! new component, so an entity snapshot handed to a listener never changes
//! under it.

use std::fmt;
use std::str::FromStr;

use atrium_core::{Aabb2, ValidationResult, Vec2, Vec3, EPSILON};
use serde::{Deserialize, Serialize};

use crate::error::ComponentError;

/// Discriminant of a component, with a stable string tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Transform,
    Render,
    Physics,
    Wall,
    Floor,
    Tool,
    Footprint,
}

impl ComponentType {
    /// Every component type, in tag order
    pub const ALL: [ComponentType; 7] = [
        ComponentType::Transform,
        ComponentType::Render,
        ComponentType::Physics,
        ComponentType::Wall,
        ComponentType::Floor,
        ComponentType::Tool,
        ComponentType::Footprint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Transform => "transform",
            ComponentType::Render => "render",
            ComponentType::Physics => "physics",
            ComponentType::Wall => "wall",
            ComponentType::Floor => "floor",
            ComponentType::Tool => "tool",
            ComponentType::Footprint => "footprint",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| format!("unknown component type '{s}'"))
    }
}

fn check_finite(errors: &mut Vec<String>, what: &str, ok: bool) {
    if !ok {
        errors.push(format!("{what} must be finite"));
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Position, rotation (radians, `y` is yaw) and scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Create a transform at `position` with no rotation and unit scale
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn with_position(&self, position: Vec3) -> Self {
        Self { position, ..*self }
    }

    pub fn with_rotation(&self, rotation: Vec3) -> Self {
        Self { rotation, ..*self }
    }

    pub fn with_scale(&self, scale: Vec3) -> Self {
        Self { scale, ..*self }
    }

    /// Offset the position
    pub fn translate(&self, offset: Vec3) -> Self {
        self.with_position(self.position + offset)
    }

    /// Rotation about the vertical axis
    #[inline]
    pub fn yaw(&self) -> f32 {
        self.rotation.y
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        check_finite(&mut errors, "position", self.position.is_finite());
        check_finite(&mut errors, "rotation", self.rotation.is_finite());
        check_finite(&mut errors, "scale", self.scale.is_finite());

        let mut result = ValidationResult::from_errors(errors);
        for (axis, value) in [("x", self.scale.x), ("y", self.scale.y), ("z", self.scale.z)] {
            if value.abs() < EPSILON {
                result = result.with_warning(format!("scale.{axis} is zero"));
            }
        }
        result
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Mesh the renderer should draw for an entity
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshKind {
    #[default]
    Box,
    Plane,
    Cylinder,
    Sphere,
    /// Asset key resolved by the renderer
    Custom(String),
}

/// Appearance data consumed by the renderer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Render {
    /// Linear RGB, each channel in `[0, 1]`
    pub color: [f32; 3],
    pub opacity: f32,
    pub visible: bool,
    pub material: Option<String>,
    pub mesh: MeshKind,
}

impl Render {
    /// Create an opaque, visible box of the given color
    pub fn new(color: [f32; 3]) -> Self {
        Self {
            color,
            opacity: 1.0,
            visible: true,
            material: None,
            mesh: MeshKind::Box,
        }
    }

    pub fn with_color(&self, color: [f32; 3]) -> Self {
        Self {
            color,
            ..self.clone()
        }
    }

    pub fn with_opacity(&self, opacity: f32) -> Self {
        Self {
            opacity,
            ..self.clone()
        }
    }

    pub fn with_visibility(&self, visible: bool) -> Self {
        Self {
            visible,
            ..self.clone()
        }
    }

    pub fn with_material(&self, material: impl Into<String>) -> Self {
        Self {
            material: Some(material.into()),
            ..self.clone()
        }
    }

    pub fn with_mesh(&self, mesh: MeshKind) -> Self {
        Self {
            mesh,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        if !(0.0..=1.0).contains(&self.opacity) {
            errors.push(format!("opacity {} outside [0, 1]", self.opacity));
        }
        if self.color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            errors.push("color channels must lie in [0, 1]".to_string());
        }

        let result = ValidationResult::from_errors(errors);
        if self.visible && self.opacity == 0.0 {
            result.with_warning("visible but fully transparent")
        } else {
            result
        }
    }
}

impl Default for Render {
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0])
    }
}

// ---------------------------------------------------------------------------
// Physics
// ---------------------------------------------------------------------------

/// Minimal rigid-body state: forces accumulate until the next `integrate`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Physics {
    pub mass: f32,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Force accumulated since the last step
    pub force: Vec3,
    pub collider_radius: f32,
    pub is_static: bool,
}

impl Physics {
    /// Create a dynamic body at rest.
    ///
    /// Fails on non-positive mass or a negative collider radius.
    pub fn new(mass: f32, collider_radius: f32) -> Result<Self, ComponentError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(ComponentError::invalid("physics", format!("mass must be positive, got {mass}")));
        }
        if !(collider_radius.is_finite() && collider_radius >= 0.0) {
            return Err(ComponentError::invalid(
                "physics",
                format!("collider radius must be non-negative, got {collider_radius}"),
            ));
        }
        Ok(Self {
            mass,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            force: Vec3::ZERO,
            collider_radius,
            is_static: false,
        })
    }

    pub fn with_velocity(&self, velocity: Vec3) -> Self {
        Self {
            velocity,
            ..self.clone()
        }
    }

    pub fn with_static(&self, is_static: bool) -> Self {
        Self {
            is_static,
            ..self.clone()
        }
    }

    /// Accumulate a force. Static bodies ignore forces.
    pub fn apply_force(&self, force: Vec3) -> Self {
        if self.is_static {
            return self.clone();
        }
        Self {
            force: self.force + force,
            ..self.clone()
        }
    }

    /// Advance one step with semi-implicit Euler and clear the accumulated force
    pub fn integrate(&self, dt: f32) -> Self {
        if self.is_static {
            return Self {
                force: Vec3::ZERO,
                ..self.clone()
            };
        }
        let acceleration = self.force / self.mass;
        Self {
            velocity: self.velocity + acceleration * dt,
            acceleration,
            force: Vec3::ZERO,
            ..self.clone()
        }
    }

    /// Distance travelled over `dt` at the current velocity
    pub fn displacement(&self, dt: f32) -> Vec3 {
        self.velocity * dt
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        if !(self.mass > 0.0) {
            errors.push("mass must be positive".to_string());
        }
        if !(self.collider_radius >= 0.0) {
            errors.push("collider radius must be non-negative".to_string());
        }
        check_finite(&mut errors, "velocity", self.velocity.is_finite());
        check_finite(&mut errors, "force", self.force.is_finite());
        ValidationResult::from_errors(errors)
    }
}

// ---------------------------------------------------------------------------
// Wall
// ---------------------------------------------------------------------------

/// Straight wall segment on the floor plane
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub start: Vec2,
    pub end: Vec2,
    pub height: f32,
    pub thickness: f32,
}

impl Wall {
    pub fn new(start: Vec2, end: Vec2, height: f32, thickness: f32) -> Result<Self, ComponentError> {
        let wall = Self {
            start,
            end,
            height,
            thickness,
        };
        let result = wall.validate();
        if result.is_valid {
            Ok(wall)
        } else {
            Err(ComponentError::invalid("wall", result.errors.join("; ")))
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    pub fn with_end(&self, end: Vec2) -> Self {
        Self { end, ..*self }
    }

    /// Box covering the segment, padded by half the thickness
    pub fn bounds(&self) -> Aabb2 {
        let half = self.thickness * 0.5;
        Aabb2::new(
            self.start.min(self.end) - Vec2::splat(half),
            self.start.max(self.end) + Vec2::splat(half),
        )
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        check_finite(&mut errors, "wall endpoints", self.start.is_finite() && self.end.is_finite());
        if self.length() < EPSILON {
            errors.push("wall has zero length".to_string());
        }
        if !(self.height > 0.0) {
            errors.push("wall height must be positive".to_string());
        }
        if !(self.thickness > 0.0) {
            errors.push("wall thickness must be positive".to_string());
        }
        ValidationResult::from_errors(errors)
    }
}

// ---------------------------------------------------------------------------
// Floor
// ---------------------------------------------------------------------------

/// Floor polygon
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub points: Vec<Vec2>,
    pub elevation: f32,
    pub material: Option<String>,
}

impl Floor {
    pub fn new(points: Vec<Vec2>, elevation: f32) -> Result<Self, ComponentError> {
        let floor = Self {
            points,
            elevation,
            material: None,
        };
        let result = floor.validate();
        if result.is_valid {
            Ok(floor)
        } else {
            Err(ComponentError::invalid("floor", result.errors.join("; ")))
        }
    }

    /// Enclosed area (shoelace formula), independent of winding
    pub fn area(&self) -> f32 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f32 = (0..n)
            .map(|i| self.points[i].perp_dot(self.points[(i + 1) % n]))
            .sum();
        twice.abs() * 0.5
    }

    /// Append a vertex
    pub fn with_point(&self, point: Vec2) -> Self {
        let mut points = self.points.clone();
        points.push(point);
        Self {
            points,
            ..self.clone()
        }
    }

    pub fn with_material(&self, material: impl Into<String>) -> Self {
        Self {
            material: Some(material.into()),
            ..self.clone()
        }
    }

    pub fn bounds(&self) -> Option<Aabb2> {
        Aabb2::from_points(&self.points)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        if self.points.len() < 3 {
            errors.push(format!("floor needs at least 3 points, got {}", self.points.len()));
        } else if self.area() < EPSILON {
            errors.push("floor has zero area".to_string());
        }
        check_finite(
            &mut errors,
            "floor points",
            self.points.iter().all(|p| p.is_finite()),
        );
        ValidationResult::from_errors(errors)
    }
}

// ---------------------------------------------------------------------------
// Tool tag
// ---------------------------------------------------------------------------

/// Marks an entity owned by a tool, e.g. a placement preview
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolTag {
    pub tool_id: String,
    pub preview: bool,
}

impl ToolTag {
    pub fn new(tool_id: impl Into<String>) -> Self {
        Self {
            tool_id: tool_id.into(),
            preview: false,
        }
    }

    pub fn preview(tool_id: impl Into<String>) -> Self {
        Self {
            tool_id: tool_id.into(),
            preview: true,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        if self.tool_id.trim().is_empty() {
            ValidationResult::invalid("tool id must not be empty")
        } else {
            ValidationResult::valid()
        }
    }
}

// ---------------------------------------------------------------------------
// Footprint
// ---------------------------------------------------------------------------

/// Floor-plane shape occupied by an object, in local coordinates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FootprintShape {
    /// Rectangle centered on the object's origin
    Box { width: f32, depth: f32, height: f32 },
    /// Outline relative to the object's origin
    Polygon { points: Vec<Vec2>, height: f32 },
}

/// Space an object occupies, used by placement validation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub shape: FootprintShape,
}

impl Footprint {
    /// Rectangular footprint
    pub fn boxed(width: f32, depth: f32, height: f32) -> Result<Self, ComponentError> {
        Self::checked(FootprintShape::Box {
            width,
            depth,
            height,
        })
    }

    /// Polygonal footprint
    pub fn polygon(points: Vec<Vec2>, height: f32) -> Result<Self, ComponentError> {
        Self::checked(FootprintShape::Polygon { points, height })
    }

    fn checked(shape: FootprintShape) -> Result<Self, ComponentError> {
        let footprint = Self { shape };
        let result = footprint.validate();
        if result.is_valid {
            Ok(footprint)
        } else {
            Err(ComponentError::invalid("footprint", result.errors.join("; ")))
        }
    }

    pub fn height(&self) -> f32 {
        match &self.shape {
            FootprintShape::Box { height, .. } | FootprintShape::Polygon { height, .. } => *height,
        }
    }

    /// Unrotated bounds around the object's origin
    pub fn local_bounds(&self) -> Aabb2 {
        match &self.shape {
            FootprintShape::Box { width, depth, .. } => {
                Aabb2::from_center_size(Vec2::ZERO, Vec2::new(*width, *depth))
            }
            FootprintShape::Polygon { points, .. } => {
                Aabb2::from_points(points).unwrap_or(Aabb2::new(Vec2::ZERO, Vec2::ZERO))
            }
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        match &self.shape {
            FootprintShape::Box {
                width,
                depth,
                height,
            } => {
                if !(*width > 0.0 && *depth > 0.0) {
                    errors.push(format!("footprint must have positive size, got {width}x{depth}"));
                }
                if !(*height >= 0.0) {
                    errors.push("footprint height must be non-negative".to_string());
                }
            }
            FootprintShape::Polygon { points, height } => {
                if points.len() < 3 {
                    errors.push("polygon footprint needs at least 3 points".to_string());
                }
                if !(*height >= 0.0) {
                    errors.push("footprint height must be non-negative".to_string());
                }
                check_finite(&mut errors, "footprint points", points.iter().all(|p| p.is_finite()));
            }
        }
        ValidationResult::from_errors(errors)
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A typed data facet of an entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Component {
    Transform(Transform),
    Render(Render),
    Physics(Physics),
    Wall(Wall),
    Floor(Floor),
    Tool(ToolTag),
    Footprint(Footprint),
}

impl Component {
    pub fn component_type(&self) -> ComponentType {
        match self {
            Component::Transform(_) => ComponentType::Transform,
            Component::Render(_) => ComponentType::Render,
            Component::Physics(_) => ComponentType::Physics,
            Component::Wall(_) => ComponentType::Wall,
            Component::Floor(_) => ComponentType::Floor,
            Component::Tool(_) => ComponentType::Tool,
            Component::Footprint(_) => ComponentType::Footprint,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        match self {
            Component::Transform(c) => c.validate(),
            Component::Render(c) => c.validate(),
            Component::Physics(c) => c.validate(),
            Component::Wall(c) => c.validate(),
            Component::Floor(c) => c.validate(),
            Component::Tool(c) => c.validate(),
            Component::Footprint(c) => c.validate(),
        }
    }
}

/// Concrete component types that can be read back out of a [`Component`]
pub trait ComponentKind: Into<Component> + Clone {
    const TYPE: ComponentType;

    fn from_component(component: &Component) -> Option<&Self>;
}

macro_rules! impl_component_kind {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Component {
                fn from(c: $ty) -> Self {
                    Component::$variant(c)
                }
            }

            impl ComponentKind for $ty {
                const TYPE: ComponentType = ComponentType::$variant;

                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$variant(c) => Some(c),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_component_kind! {
    Transform => Transform,
    Render => Render,
    Physics => Physics,
    Wall => Wall,
    Floor => Floor,
    Tool => ToolTag,
    Footprint => Footprint,
}

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    rc::Rc,
    time::Instant,
};

use log::{error, warn};

use seer_shared::{
    math::{
        bbox_from_element, orientation_from_element, point_from_element, to_local_coords,
        to_parent_coords, vector_from_element,
    },
    BoundingBox, Element, ElementError, EntityData, EntityId, Operation, Orientation, Point,
    PropertyMap, TypeInfo, Vector, RESERVED_ATTRIBUTES,
};

use crate::{
    error::EntityError,
    events::EntityEvent,
    signal::{Signal, SlotHandle},
    world::{behaviour::EntityBehaviour, prediction::EntityHost, task::Task},
};

const KINEMATIC_PROPERTIES: [&str; 4] = ["pos", "orientation", "velocity", "angular"];

/// Kinematic state extrapolated from the last authoritative update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedState {
    pub position: Point,
    pub orientation: Orientation,
    pub velocity: Vector,
}

/// Returned by [`Entity::observe`], used to stop observing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverHandle {
    property: String,
    slot: SlotHandle,
}

/// Local mirror of one server-side game object.
///
/// Entities are owned by their [`View`](crate::View). The hierarchy is held
/// as ids: `location` names the containing entity and `contents` lists the
/// contained ones, both resolved through the View.
pub struct Entity {
    id: EntityId,
    type_info: Rc<TypeInfo>,
    name: String,
    stamp: f64,

    location: Option<EntityId>,
    contents: Vec<EntityId>,
    waiting_for_parent: bool,

    visible: bool,
    calculated_visible: bool,
    recently_created: bool,
    shut_down: bool,

    properties: PropertyMap,
    observers: HashMap<String, Signal<Element>>,
    update_level: u32,
    modified_properties: BTreeSet<String>,

    position: Point,
    orientation: Orientation,
    velocity: Vector,
    angular_velocity: Vector,
    bbox: Option<BoundingBox>,
    last_pos_time: Option<Instant>,
    last_orientation_time: Option<Instant>,
    predicted: PredictedState,
    moving: bool,

    tasks: BTreeMap<String, Task>,
    behaviour: Option<Box<dyn EntityBehaviour>>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, type_info: Rc<TypeInfo>) -> Self {
        Self {
            id: id.into(),
            type_info,
            name: String::new(),
            stamp: 0.0,
            location: None,
            contents: Vec::new(),
            waiting_for_parent: false,
            visible: false,
            calculated_visible: false,
            recently_created: false,
            shut_down: false,
            properties: PropertyMap::new(),
            observers: HashMap::new(),
            update_level: 0,
            modified_properties: BTreeSet::new(),
            position: Point::origin(),
            orientation: Orientation::identity(),
            velocity: Vector::zeros(),
            angular_velocity: Vector::zeros(),
            bbox: None,
            last_pos_time: None,
            last_orientation_time: None,
            predicted: PredictedState {
                position: Point::origin(),
                orientation: Orientation::identity(),
                velocity: Vector::zeros(),
            },
            moving: false,
            tasks: BTreeMap::new(),
            behaviour: None,
        }
    }

    pub fn with_behaviour(mut self, behaviour: Box<dyn EntityBehaviour>) -> Self {
        self.behaviour = Some(behaviour);
        self
    }

    // Identity

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_info(&self) -> &Rc<TypeInfo> {
        &self.type_info
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Server modification time of the last applied state, in seconds
    pub fn stamp(&self) -> f64 {
        self.stamp
    }

    // Hierarchy

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn contents(&self) -> &[EntityId] {
        &self.contents
    }

    pub fn has_child(&self, entity_id: &str) -> bool {
        self.contents.iter().any(|child| child == entity_id)
    }

    /// True while the location id is known but the location entity is not
    /// in the view yet
    pub fn is_waiting_for_parent(&self) -> bool {
        self.waiting_for_parent
    }

    // Visibility

    /// Effective visibility: this entity is flagged visible, its location is
    /// bound, and every ancestor is visible
    pub fn is_visible(&self) -> bool {
        self.calculated_visible
    }

    /// The visibility flag of this entity alone, ignoring ancestors
    pub fn visible_flag(&self) -> bool {
        self.visible
    }

    pub fn is_recently_created(&self) -> bool {
        self.recently_created
    }

    // Properties

    /// Instance value of a property, falling back to the type chain defaults
    pub fn value_of_property(&self, name: &str) -> Result<&Element, EntityError> {
        self.ptr_of_property(name)
            .ok_or_else(|| EntityError::PropertyNotFound {
                entity_id: self.id.clone(),
                name: name.to_string(),
            })
    }

    pub fn ptr_of_property(&self, name: &str) -> Option<&Element> {
        self.properties
            .get(name)
            .or_else(|| self.type_info.property(name))
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.ptr_of_property(name).is_some()
    }

    /// Type defaults merged with the instance overrides
    pub fn properties(&self) -> PropertyMap {
        let mut merged = self.type_info.merged_properties();
        for (name, value) in &self.properties {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }

    pub fn instance_properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Calls `slot` every time the property changes. With `evaluate_now`
    /// the slot is also called right away if the property has a value.
    pub fn observe(
        &mut self,
        name: &str,
        mut slot: impl FnMut(&Element) + 'static,
        evaluate_now: bool,
    ) -> ObserverHandle {
        if evaluate_now {
            if let Some(value) = self.ptr_of_property(name) {
                slot(value);
            }
        }
        let handle = self
            .observers
            .entry(name.to_string())
            .or_default()
            .connect(slot);
        ObserverHandle {
            property: name.to_string(),
            slot: handle,
        }
    }

    pub fn unobserve(&mut self, handle: &ObserverHandle) -> bool {
        let Some(signal) = self.observers.get_mut(&handle.property) else {
            return false;
        };
        let removed = signal.disconnect(handle.slot);
        if signal.is_empty() {
            self.observers.remove(&handle.property);
        }
        removed
    }

    // Kinematics

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    pub fn angular_velocity(&self) -> Vector {
        self.angular_velocity
    }

    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn predicted(&self) -> &PredictedState {
        &self.predicted
    }

    pub fn predicted_position(&self) -> Point {
        self.predicted.position
    }

    pub fn predicted_orientation(&self) -> Orientation {
        self.predicted.orientation
    }

    pub fn predicted_velocity(&self) -> Vector {
        self.predicted.velocity
    }

    /// Converts a point in this entity's local frame to its location's frame
    pub fn to_location_coords(&self, local: &Point) -> Point {
        to_parent_coords(local, &self.predicted.position, &self.predicted.orientation)
    }

    /// Converts a point in the location's frame to this entity's local frame
    pub fn from_location_coords(&self, point: &Point) -> Point {
        to_local_coords(point, &self.predicted.position, &self.predicted.orientation)
    }

    pub fn to_location_vector(&self, local: &Vector) -> Vector {
        self.predicted.orientation * local
    }

    pub fn from_location_vector(&self, vector: &Vector) -> Vector {
        self.predicted.orientation.inverse() * vector
    }

    // Tasks

    pub fn tasks(&self) -> &BTreeMap<String, Task> {
        &self.tasks
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    pub fn behaviour(&self) -> Option<&dyn EntityBehaviour> {
        self.behaviour.as_deref()
    }

    pub fn behaviour_mut(&mut self) -> Option<&mut (dyn EntityBehaviour + 'static)> {
        self.behaviour.as_deref_mut()
    }

    // View-driven mutation

    /// Applies the first sight of this entity. Type defaults for native
    /// properties are mirrored before the instance attributes are applied.
    pub(crate) fn init(&mut self, data: &EntityData, from_create: bool, host: &mut dyn EntityHost) {
        self.recently_created = from_create;

        let defaults = self.type_info.merged_properties();
        for (name, value) in &defaults {
            if data.attributes.contains_key(name) {
                continue;
            }
            if let Err(err) = self.try_apply_native(name, value, host) {
                warn!("Ignoring type default: {}", err);
            }
        }

        self.set_from_data(data, host);

        if let Some(behaviour) = self.behaviour.as_mut() {
            behaviour.on_init(data);
        }
    }

    /// Applies sight or set data as one batched update
    pub(crate) fn set_from_data(&mut self, data: &EntityData, host: &mut dyn EntityHost) {
        self.begin_update();
        if let Some(stamp) = data.stamp {
            self.stamp = stamp;
        }
        for (name, value) in &data.attributes {
            if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
                continue;
            }
            self.set_property(name, value.clone(), host);
        }
        self.end_update(host);
    }

    pub(crate) fn set_property(&mut self, name: &str, value: Element, host: &mut dyn EntityHost) {
        self.begin_update();
        if let Err(err) = self.try_apply_native(name, &value, host) {
            warn!("{}", err);
        }
        if let Some(signal) = self.observers.get_mut(name) {
            signal.emit(&value);
        }
        if let Some(behaviour) = self.behaviour.as_mut() {
            behaviour.on_property_changed(name, &value);
        }
        self.properties.insert(name.to_string(), value);
        self.modified_properties.insert(name.to_string());
        self.end_update(host);
    }

    pub(crate) fn begin_update(&mut self) {
        self.update_level += 1;
    }

    /// Closes a batch. The outermost close reports every modified property
    /// in one `Changed` event and refreshes the moving state.
    pub(crate) fn end_update(&mut self, host: &mut dyn EntityHost) {
        if self.update_level == 0 {
            error!("Unbalanced end_update on entity '{}'", self.id);
            return;
        }
        self.update_level -= 1;
        if self.update_level > 0 || self.modified_properties.is_empty() {
            return;
        }

        let modified = std::mem::take(&mut self.modified_properties);
        let kinematic = KINEMATIC_PROPERTIES
            .iter()
            .any(|name| modified.contains(*name));
        host.emit(&self.id, EntityEvent::Changed(modified));

        if kinematic {
            let moving = self.velocity.norm_squared() > 0.0
                || self.angular_velocity.norm_squared() > 0.0;
            self.set_moving(moving, host);
            host.emit(&self.id, EntityEvent::Moved);
        }
    }

    fn set_moving(&mut self, moving: bool, host: &mut dyn EntityHost) {
        if self.moving == moving {
            return;
        }
        self.moving = moving;
        if moving {
            host.add_to_prediction(&self.id);
        } else {
            self.predicted.position = self.position;
            self.predicted.orientation = self.orientation;
            host.remove_from_prediction(&self.id);
        }
        self.predicted.velocity = self.velocity;
        host.emit(&self.id, EntityEvent::Moving(moving));
    }

    /// Mirrors native properties into their typed fields. Other names are
    /// left to the property map alone.
    fn try_apply_native(
        &mut self,
        name: &str,
        value: &Element,
        host: &mut dyn EntityHost,
    ) -> Result<(), EntityError> {
        let invalid = |source: ElementError| EntityError::InvalidPropertyValue {
            entity_id: self.id.clone(),
            name: name.to_string(),
            source,
        };
        match name {
            "pos" => {
                self.position = point_from_element(value).map_err(invalid)?;
                self.last_pos_time = Some(host.now());
                self.predicted.position = self.position;
            }
            "velocity" => {
                self.velocity = vector_from_element(value).map_err(invalid)?;
                self.last_pos_time = Some(host.now());
                self.predicted.position = self.position;
                self.predicted.velocity = self.velocity;
            }
            "orientation" => {
                self.orientation = orientation_from_element(value).map_err(invalid)?;
                self.last_orientation_time = Some(host.now());
                self.predicted.orientation = self.orientation;
            }
            "angular" => {
                self.angular_velocity = vector_from_element(value).map_err(invalid)?;
                self.last_orientation_time = Some(host.now());
                self.predicted.orientation = self.orientation;
            }
            "name" => {
                self.name = value.try_as_str().map_err(invalid)?.to_string();
            }
            "stamp" => {
                self.stamp = value.try_as_float().map_err(invalid)?;
            }
            "bbox" => {
                self.bbox = Some(bbox_from_element(value).map_err(invalid)?);
            }
            "tasks" => self.update_tasks(value, host),
            _ => {}
        }
        Ok(())
    }

    fn update_tasks(&mut self, value: &Element, host: &mut dyn EntityHost) {
        let empty = PropertyMap::new();
        let descriptions = value.as_map().unwrap_or(&empty);

        let removed: Vec<String> = self
            .tasks
            .keys()
            .filter(|task_id| !descriptions.contains_key(*task_id))
            .cloned()
            .collect();
        for task_id in removed {
            self.tasks.remove(&task_id);
            host.task_rate_changed(&self.id, &task_id, 0.0);
            host.emit(&self.id, EntityEvent::TaskRemoved(task_id));
        }

        for (task_id, description) in descriptions {
            let Some(description) = description.as_map() else {
                warn!("Task '{}' on entity '{}' is not a map", task_id, self.id);
                continue;
            };
            let is_new = !self.tasks.contains_key(task_id);
            let task = self
                .tasks
                .entry(task_id.clone())
                .or_insert_with(|| Task::new(task_id.clone()));
            let rate_changed = task.update_from_map(description);
            let (rate, progress) = (task.rate(), task.progress());

            if is_new || rate_changed {
                host.task_rate_changed(&self.id, task_id, rate);
            }
            if is_new {
                host.emit(&self.id, EntityEvent::TaskAdded(task_id.clone()));
            } else {
                host.emit(
                    &self.id,
                    EntityEvent::TaskProgressed {
                        task_id: task_id.clone(),
                        progress,
                    },
                );
            }
        }
    }

    /// Extrapolates position and orientation to `now`. Elapsed time is
    /// scaled by the simulation speed.
    pub(crate) fn update_predicted_state(&mut self, now: Instant, simulation_speed: f64) {
        if !self.moving {
            return;
        }
        if let Some(last_pos_time) = self.last_pos_time {
            let elapsed = now.saturating_duration_since(last_pos_time).as_secs_f64();
            self.predicted.position = self.position + self.velocity * (elapsed * simulation_speed);
        }
        if let Some(last_orientation_time) = self.last_orientation_time {
            let elapsed = now
                .saturating_duration_since(last_orientation_time)
                .as_secs_f64();
            let rotation =
                Orientation::from_scaled_axis(self.angular_velocity * (elapsed * simulation_speed));
            self.predicted.orientation = rotation * self.orientation;
        }
        self.predicted.velocity = self.velocity;
    }

    pub(crate) fn update_task_progress(&mut self, task_id: &str, elapsed: f64) {
        if let Some(task) = self.tasks.get_mut(task_id) {
            task.update_predicted_progress(elapsed);
        }
    }

    pub(crate) fn set_location_id(&mut self, location: Option<EntityId>) -> Option<EntityId> {
        std::mem::replace(&mut self.location, location)
    }

    pub(crate) fn set_waiting_for_parent(&mut self, waiting: bool) {
        self.waiting_for_parent = waiting;
    }

    pub(crate) fn add_child(&mut self, child_id: &str) -> bool {
        if self.has_child(child_id) {
            return false;
        }
        self.contents.push(child_id.to_string());
        true
    }

    pub(crate) fn remove_child(&mut self, child_id: &str) -> bool {
        let before = self.contents.len();
        self.contents.retain(|id| id != child_id);
        self.contents.len() != before
    }

    pub(crate) fn set_visible_flag(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_calculated_visible(&mut self, visible: bool) {
        self.calculated_visible = visible;
    }

    pub(crate) fn clear_recently_created(&mut self) -> bool {
        std::mem::replace(&mut self.recently_created, false)
    }

    /// Replaces position and orientation without emitting any event, used
    /// when the entity moves to a new frame of reference
    pub(crate) fn set_transform(&mut self, position: Point, orientation: Orientation) {
        self.position = position;
        self.orientation = orientation;
        self.predicted.position = position;
        self.predicted.orientation = orientation;
    }

    pub(crate) fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub(crate) fn shutdown(&mut self, host: &mut dyn EntityHost) {
        if self.shut_down {
            return;
        }
        host.emit(&self.id, EntityEvent::BeingDeleted);
        if let Some(behaviour) = self.behaviour.as_mut() {
            behaviour.on_shutdown();
        }
        if self.moving {
            self.moving = false;
            host.remove_from_prediction(&self.id);
        }
        for task_id in self.tasks.keys() {
            host.task_rate_changed(&self.id, task_id, 0.0);
        }
        self.observers.clear();
        self.shut_down = true;
    }

    // Hooks

    pub(crate) fn on_action(&mut self, op: &Operation, ty: &TypeInfo, host: &mut dyn EntityHost) {
        if let Some(behaviour) = self.behaviour.as_mut() {
            behaviour.on_action(op, ty);
        }
        host.emit(&self.id, EntityEvent::Acted(op.clone()));
    }

    pub(crate) fn on_hit(&mut self, op: &Operation, ty: &TypeInfo, host: &mut dyn EntityHost) {
        if let Some(behaviour) = self.behaviour.as_mut() {
            behaviour.on_hit(op, ty);
        }
        host.emit(&self.id, EntityEvent::Hit(op.clone()));
    }

    pub(crate) fn on_talk(&mut self, data: &EntityData, host: &mut dyn EntityHost) {
        if let Some(behaviour) = self.behaviour.as_mut() {
            behaviour.on_talk(data);
        }
        host.emit(&self.id, EntityEvent::Say(data.clone()));
    }

    pub(crate) fn on_sound_action(&mut self, op: &Operation, host: &mut dyn EntityHost) {
        host.emit(&self.id, EntityEvent::Noise(op.clone()));
    }

    pub(crate) fn on_imaginary(&mut self, op: &Operation, host: &mut dyn EntityHost) {
        let description = op
            .first_entity_arg()
            .and_then(|arg| arg.attr("description"))
            .and_then(Element::as_str);
        match description {
            Some(description) => {
                host.emit(&self.id, EntityEvent::Emote(description.to_string()));
            }
            None => warn!("Imaginary from '{}' has no description", self.id),
        }
    }
}

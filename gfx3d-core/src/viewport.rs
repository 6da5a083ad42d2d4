//! The scene-graph owner: objects, camera, lights and the per-frame driver.
//!
//! A frame is `render()`: every dirty object recomputes its cache through
//! `screen basis * camera * parents * local`, then each composite schedules
//! its children and hands the order to its drawer, which updates the 2D
//! shapes on the surface. Objects that did not change keep their cache.

use nalgebra::Vector3;
use slotmap::SlotMap;

use crate::color::Color;
use crate::drawer::Drawer;
use crate::error::{Error, Result};
use crate::gradient::DEFAULT_GRADIENT_SAMPLES;
use crate::lighting::{Ambient, Light, Lighting};
use crate::matrix::Matrix3D;
use crate::object::{
    Composite, Cube, CubeDescriptor, Cylinder, CylinderDescriptor, DrawContext, Edges,
    EdgesDescriptor, Mesh, MeshDescriptor, Object3D, ObjectId, Orbit, OrbitDescriptor, Path3D,
    Path3DDescriptor, Polygon, PolygonDescriptor, Scene,
};
use crate::projection::{screen_incident, view_matrix};
use crate::scheduler::{ScheduleEntry, Scheduler};
use crate::surface::{ShapeId, Surface};

/// Viewport settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    /// Strategy of the root composite and default for new scenes.
    pub scheduler: Scheduler,
    pub drawer: Drawer,
    /// Angular steps of curved-surface gradients.
    pub gradient_samples: usize,
    /// View direction in screen space.
    pub incident: Vector3<f64>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            scheduler: Scheduler::default(),
            drawer: Drawer::default(),
            gradient_samples: DEFAULT_GRADIENT_SAMPLES,
            incident: screen_incident(),
        }
    }
}

impl ViewportConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_drawer(mut self, drawer: Drawer) -> Self {
        self.drawer = drawer;
        self
    }

    pub fn with_gradient_samples(mut self, samples: usize) -> Self {
        self.gradient_samples = samples.max(1);
        self
    }

    pub fn with_incident(mut self, incident: Vector3<f64>) -> Self {
        self.incident = incident;
        self
    }
}

pub struct Viewport<S: Surface> {
    objects: SlotMap<ObjectId, Object3D>,
    root: Composite,
    camera: Matrix3D,
    config: ViewportConfig,
    lighting: Lighting,
    surface: S,
    group: Option<ShapeId>,
}

impl<S: Surface> Viewport<S> {
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, ViewportConfig::default())
    }

    pub fn with_config(surface: S, config: ViewportConfig) -> Self {
        Self {
            objects: SlotMap::with_key(),
            root: Composite::new(config.scheduler, config.drawer),
            camera: Matrix3D::identity(),
            lighting: Lighting::new(config.incident, Vec::new(), Ambient::default(), Color::WHITE),
            config,
            surface,
            group: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn create_edges(&mut self, descriptor: EdgesDescriptor) -> Result<ObjectId> {
        Ok(self.insert(None, Edges::new(descriptor)?.into()))
    }

    pub fn create_polygon(&mut self, descriptor: PolygonDescriptor) -> Result<ObjectId> {
        Ok(self.insert(None, Polygon::new(descriptor)?.into()))
    }

    pub fn create_triangles(&mut self, descriptor: MeshDescriptor) -> Result<ObjectId> {
        Ok(self.insert(None, Object3D::Triangles(Mesh::triangles(descriptor)?)))
    }

    pub fn create_quads(&mut self, descriptor: MeshDescriptor) -> Result<ObjectId> {
        Ok(self.insert(None, Object3D::Quads(Mesh::quads(descriptor)?)))
    }

    pub fn create_cube(&mut self, descriptor: CubeDescriptor) -> ObjectId {
        self.insert(None, Cube::new(descriptor).into())
    }

    pub fn create_cylinder(&mut self, descriptor: CylinderDescriptor) -> Result<ObjectId> {
        Ok(self.insert(None, Cylinder::new(descriptor)?.into()))
    }

    pub fn create_orbit(&mut self, descriptor: OrbitDescriptor) -> Result<ObjectId> {
        Ok(self.insert(None, Orbit::new(descriptor)?.into()))
    }

    pub fn create_path3d(&mut self, descriptor: Path3DDescriptor) -> Result<ObjectId> {
        Ok(self.insert(None, Path3D::new(descriptor)?.into()))
    }

    /// Creates an empty scene using the viewport's strategies.
    pub fn create_scene(&mut self) -> ObjectId {
        let scene = Scene::with_strategies(self.config.scheduler, self.config.drawer);
        self.insert(None, scene.into())
    }

    /// Attaches an already built object to `parent`, which must be a scene,
    /// or to the viewport itself.
    pub fn create_in(
        &mut self,
        parent: Option<ObjectId>,
        object: impl Into<Object3D>,
    ) -> Result<ObjectId> {
        if let Some(parent) = parent {
            let owner = self.objects.get(parent).ok_or(Error::UnknownObject)?;
            if owner.as_scene().is_none() {
                return Err(Error::DescriptorMismatch {
                    expected: "scene",
                    found: owner.kind(),
                });
            }
        }
        Ok(self.insert(parent, object.into()))
    }

    fn insert(&mut self, parent: Option<ObjectId>, mut object: Object3D) -> ObjectId {
        object.base_mut().parent = parent;
        let kind = object.kind();
        let id = self.objects.insert(object);
        match parent {
            None => self.root.attach(id),
            Some(parent) => {
                if let Some(scene) = self.objects.get_mut(parent).and_then(Object3D::as_scene_mut) {
                    scene.composite.attach(id);
                }
                self.mark_upward(parent);
            }
        }
        log::trace!("created {kind} {id:?}");
        id
    }

    pub fn object(&self, id: ObjectId) -> Result<&Object3D> {
        self.objects.get(id).ok_or(Error::UnknownObject)
    }

    /// Mutable access; the object is redrawn on the next frame.
    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object3D> {
        self.invalidate(id)?;
        self.objects.get_mut(id).ok_or(Error::UnknownObject)
    }

    /// Marks an object, everything below it and the chain of scenes above it dirty.
    pub fn invalidate(&mut self, id: ObjectId) -> Result<()> {
        if !self.objects.contains_key(id) {
            return Err(Error::UnknownObject);
        }
        self.mark_subtree(id);
        self.mark_upward(id);
        Ok(())
    }

    /// Marks every object dirty.
    pub fn invalidate_all(&mut self) {
        self.root.mark_all();
        for object in self.objects.values_mut() {
            if let Some(scene) = object.as_scene_mut() {
                scene.composite.mark_all();
            }
        }
    }

    fn mark_subtree(&mut self, id: ObjectId) {
        let children = match self.objects.get_mut(id).and_then(Object3D::as_scene_mut) {
            Some(scene) => {
                scene.composite.mark_all();
                scene.composite.children.clone()
            }
            None => return,
        };
        for child in children {
            self.mark_subtree(child);
        }
    }

    fn mark_upward(&mut self, id: ObjectId) {
        let mut current = id;
        loop {
            let Some(parent) = self.objects.get(current).map(Object3D::parent) else {
                return;
            };
            match parent {
                None => {
                    self.root.mark(current);
                    return;
                }
                Some(parent) => {
                    let scene = self.objects.get_mut(parent).and_then(Object3D::as_scene_mut);
                    if let Some(scene) = scene {
                        scene.composite.mark(current);
                    }
                    current = parent;
                }
            }
        }
    }

    /// Removes an object, its descendants and their shapes.
    pub fn destroy(&mut self, id: ObjectId) -> Result<()> {
        let parent = self.object(id)?.parent();
        self.destroy_shapes(id);
        match parent {
            None => self.root.detach(id),
            Some(parent) => {
                if let Some(scene) = self.objects.get_mut(parent).and_then(Object3D::as_scene_mut) {
                    scene.composite.detach(id);
                }
            }
        }
        self.remove_subtree(id);
        log::trace!("destroyed {id:?}");
        Ok(())
    }

    fn remove_subtree(&mut self, id: ObjectId) {
        if let Some(Object3D::Scene(scene)) = self.objects.remove(id) {
            for child in scene.composite.children {
                self.remove_subtree(child);
            }
        }
    }

    /// Removes the shapes of an object and its descendants, leaving them to
    /// be recreated by the next draw.
    fn destroy_shapes(&mut self, id: ObjectId) {
        let children = match self.objects.get_mut(id) {
            Some(Object3D::Scene(scene)) => {
                scene.composite.drawn.clear();
                scene.composite.mark_all();
                scene.composite.children.clone()
            }
            Some(_) => Vec::new(),
            None => return,
        };
        for child in children {
            self.destroy_shapes(child);
        }
        if let Some(object) = self.objects.get_mut(id) {
            object.base_mut().destroy(&mut self.surface);
        }
    }

    /// Top-level objects.
    pub fn children(&self) -> &[ObjectId] {
        self.root.children()
    }

    pub fn root(&self) -> &Composite {
        &self.root
    }

    /// Number of objects at every level.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Destroys every object and the viewport's own group.
    pub fn clear(&mut self) {
        for id in self.root.children.clone() {
            self.destroy_shapes(id);
            self.remove_subtree(id);
        }
        self.root = Composite::new(self.root.scheduler, self.root.drawer);
        if let Some(group) = self.group.take() {
            self.surface.remove(group);
        }
        log::debug!("viewport cleared");
    }

    pub fn set_scheduler(&mut self, scheduler: Scheduler) {
        log::debug!("scheduler set to {scheduler:?}");
        self.config.scheduler = scheduler;
        self.root.scheduler = scheduler;
        self.root.mark_all();
    }

    pub fn set_drawer(&mut self, drawer: Drawer) {
        log::debug!("drawer set to {drawer:?}");
        self.config.drawer = drawer;
        self.root.drawer = drawer;
    }

    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.invalidate_all();
    }

    pub fn camera(&self) -> &Matrix3D {
        &self.camera
    }

    pub fn set_camera_transform(&mut self, camera: Matrix3D) {
        self.camera = camera;
        self.invalidate_all();
    }

    /// Composes `matrix` after the current camera transform.
    pub fn apply_camera_transform(&mut self, matrix: Matrix3D) {
        self.camera = Matrix3D::multiply(&[matrix, self.camera]);
        self.invalidate_all();
    }

    pub fn set_lights(&mut self, lights: Vec<Light>, ambient: Ambient, specular: Color) {
        log::debug!("lighting replaced with {} lights", lights.len());
        self.lighting = Lighting::new(self.config.incident, lights, ambient, specular);
        self.invalidate_all();
    }

    pub fn add_lights(&mut self, lights: impl IntoIterator<Item = Light>) {
        self.lighting.lights.extend(lights);
        log::debug!("lighting now has {} lights", self.lighting.lights.len());
        self.invalidate_all();
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// The viewport's top-level group, once the first frame ran.
    pub fn group(&self) -> Option<ShapeId> {
        self.group
    }

    /// Renders and draws every dirty object. Does nothing when nothing changed.
    pub fn render(&mut self) -> Result<()> {
        if !self.root.is_dirty() {
            log::trace!("frame skipped, nothing to draw");
            return Ok(());
        }
        log::trace!("frame: {} dirty top-level objects", self.root.todos.len());

        let matrix = view_matrix(&self.camera, f64::from(self.config.height));
        for id in self.root.todos.clone() {
            self.render_object(id, &matrix)?;
        }

        let surface = &mut self.surface;
        let group = *self.group.get_or_insert_with(|| surface.create_group(None));
        self.draw_composite(None, group)
    }

    fn render_object(&mut self, id: ObjectId, parent: &Matrix3D) -> Result<()> {
        let object = self.objects.get_mut(id).ok_or(Error::UnknownObject)?;
        let nested = match object {
            Object3D::Scene(scene) => {
                Some((parent.then(&scene.base.matrix), scene.composite.todos.clone()))
            }
            leaf => {
                if let Some(primitive) = leaf.primitive_mut() {
                    primitive.render(parent);
                }
                None
            }
        };
        if let Some((matrix, todos)) = nested {
            for child in todos {
                self.render_object(child, &matrix)?;
            }
        }
        Ok(())
    }

    fn composite(&self, owner: Option<ObjectId>) -> Result<&Composite> {
        match owner {
            None => Ok(&self.root),
            Some(id) => self
                .objects
                .get(id)
                .and_then(Object3D::as_scene)
                .map(|scene| &scene.composite)
                .ok_or(Error::UnknownObject),
        }
    }

    fn composite_mut(&mut self, owner: Option<ObjectId>) -> Result<&mut Composite> {
        match owner {
            None => Ok(&mut self.root),
            Some(id) => self
                .objects
                .get_mut(id)
                .and_then(Object3D::as_scene_mut)
                .map(|scene| &mut scene.composite)
                .ok_or(Error::UnknownObject),
        }
    }

    fn schedule_entry(&self, id: ObjectId, with_outline: bool) -> Result<ScheduleEntry> {
        let object = self.object(id)?;
        if let Some(scene) = object.as_scene() {
            let children = scene.children();
            let mut z = 0.0;
            for &child in children {
                z += self.schedule_entry(child, false)?.z;
            }
            if !children.is_empty() {
                z /= children.len() as f64;
            }
            return Ok(ScheduleEntry { z, outline: None });
        }
        let primitive = object.primitive().ok_or(Error::UnknownObject)?;
        Ok(ScheduleEntry {
            z: primitive.z_order(),
            outline: if with_outline {
                primitive.outline().map(<[_]>::to_vec)
            } else {
                None
            },
        })
    }

    /// Schedules the children of `owner` and lets its drawer update their shapes.
    fn draw_composite(&mut self, owner: Option<ObjectId>, group: ShapeId) -> Result<()> {
        let composite = self.composite(owner)?;
        let (scheduler, drawer) = (composite.scheduler, composite.drawer);
        let with_outline = scheduler == Scheduler::Bsp;
        let entries = composite
            .children
            .iter()
            .map(|&child| self.schedule_entry(child, with_outline))
            .collect::<Result<Vec<_>>>()?;
        let order: Vec<ObjectId> = scheduler
            .schedule(&entries)?
            .into_iter()
            .map(|i| composite.children[i])
            .collect();
        let plan = drawer.plan(&composite.todos, &composite.drawn, &order);

        for id in plan.destroy {
            self.destroy_shapes(id);
        }
        for id in plan.draw {
            self.draw_object(id, group)?;
        }

        let composite = self.composite_mut(owner)?;
        composite.drawn = order;
        composite.todos.clear();
        Ok(())
    }

    fn draw_object(&mut self, id: ObjectId, group: ShapeId) -> Result<()> {
        let object = self.objects.get_mut(id).ok_or(Error::UnknownObject)?;
        let nested = match object {
            Object3D::Scene(scene) => Some(match scene.base.shape {
                Some(own) => own,
                None => {
                    let own = self.surface.create_group(Some(group));
                    scene.base.shape = Some(own);
                    own
                }
            }),
            leaf => {
                let mut ctx = DrawContext {
                    surface: &mut self.surface,
                    parent: group,
                    lighting: &self.lighting,
                    gradient_samples: self.config.gradient_samples,
                };
                match leaf.primitive_mut() {
                    Some(primitive) => {
                        if let Err(err) = primitive.draw(&mut ctx) {
                            log::warn!("could not draw {id:?}: {err}");
                            return Err(err);
                        }
                    }
                    None => return Err(Error::UnknownObject),
                }
                None
            }
        };
        match nested {
            Some(own) => self.draw_composite(Some(id), own),
            None => Ok(()),
        }
    }
}

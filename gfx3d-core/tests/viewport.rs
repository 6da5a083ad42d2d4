use gfx3d_core::{
    Color, CubeDescriptor, Drawer, Error, Finish, Geometry, Light, Material, Paint, Polygon,
    PolygonDescriptor, RecordingSurface, Scheduler, ShapeId, Viewport,
};
use nalgebra::{Point3, Vector3};

fn square(x: f64, z: f64) -> PolygonDescriptor {
    PolygonDescriptor::new(vec![
        Point3::new(x, 0.0, z),
        Point3::new(x + 10.0, 0.0, z),
        Point3::new(x + 10.0, 10.0, z),
        Point3::new(x, 10.0, z),
    ])
}

fn leaf_xs(surface: &RecordingSurface, group: ShapeId) -> Vec<f64> {
    surface
        .leaves_of(group)
        .into_iter()
        .filter_map(|id| match &surface.shape(id)?.geometry {
            Geometry::Polyline(points) => Some(points[0].x),
            _ => None,
        })
        .collect()
}

#[test]
fn test_scene_with_its_own_scheduler() {
    let mut viewport = Viewport::new(RecordingSurface::new());
    let scene = viewport.create_scene();
    viewport
        .object_mut(scene)
        .unwrap()
        .as_scene_mut()
        .unwrap()
        .set_scheduler(Scheduler::Bsp);

    // Nearer first, so drawing in creation order would be wrong
    viewport.create_in(Some(scene), Polygon::new(square(100.0, 10.0)).unwrap()).unwrap();
    viewport.create_in(Some(scene), Polygon::new(square(0.0, 0.0)).unwrap()).unwrap();
    viewport.render().unwrap();

    let group = viewport.object(scene).unwrap().shape().unwrap();
    assert_eq!(leaf_xs(viewport.surface(), group), vec![0.0, 100.0]);
    assert_eq!(viewport.root().scheduler(), Scheduler::ZOrder);
}

#[test]
fn test_straddling_faces_fail_then_recover_with_z_order() {
    let mut viewport = Viewport::new(RecordingSurface::new());
    viewport.set_scheduler(Scheduler::Bsp);
    viewport.create_polygon(square(0.0, 0.0)).unwrap();
    viewport
        .create_polygon(PolygonDescriptor::new(vec![
            Point3::new(5.0, 0.0, -5.0),
            Point3::new(5.0, 10.0, -5.0),
            Point3::new(5.0, 10.0, 5.0),
            Point3::new(5.0, 0.0, 5.0),
        ]))
        .unwrap();

    assert_eq!(
        viewport.render().unwrap_err(),
        Error::InvalidGeometry { object: 1, plane: 0 }
    );

    viewport.set_scheduler(Scheduler::ZOrder);
    viewport.render().unwrap();
    assert_eq!(viewport.surface().paint_order().len(), 2);
}

#[test]
fn test_lit_cube() {
    let mut viewport = Viewport::new(RecordingSurface::new());
    viewport.add_lights([Light::new(Vector3::new(0.0, 0.0, -1.0), Color::WHITE)]);
    let cube = viewport.create_cube(CubeDescriptor::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 10.0, 10.0),
    ));
    viewport
        .object_mut(cube)
        .unwrap()
        .set_fill(Material::new(Finish::Matte, Color::WHITE));
    viewport.render().unwrap();

    let group = viewport.object(cube).unwrap().shape().unwrap();
    let surface = viewport.surface();
    let faces = surface.leaves_of(group);
    assert_eq!(faces.len(), 6);
    assert!(faces
        .iter()
        .all(|&id| matches!(surface.shape(id).unwrap().fill, Some(Paint::Solid(_)))));
}

#[test]
fn test_incremental_drawer_leaves_clean_objects_alone() {
    let mut viewport = Viewport::new(RecordingSurface::new());
    viewport.set_drawer(Drawer::Incremental);
    let a = viewport.create_polygon(square(0.0, 0.0)).unwrap();
    let b = viewport.create_polygon(square(50.0, 1.0)).unwrap();
    viewport.render().unwrap();
    let b_shape = viewport.object(b).unwrap().shape();

    viewport.object_mut(a).unwrap().set_fill(Color::RED);
    viewport.render().unwrap();
    assert_eq!(viewport.surface().removed_count(), 0);
    assert_eq!(viewport.object(b).unwrap().shape(), b_shape);
}

#[test]
fn test_destroy_and_clear() {
    let mut viewport = Viewport::new(RecordingSurface::new());
    let a = viewport.create_polygon(square(0.0, 0.0)).unwrap();
    viewport.create_cube(CubeDescriptor::default());
    viewport.render().unwrap();

    viewport.destroy(a).unwrap();
    assert_eq!(viewport.object(a).unwrap_err(), Error::UnknownObject);
    assert_eq!(viewport.len(), 1);
    assert_eq!(viewport.surface().paint_order().len(), 6);

    viewport.clear();
    assert!(viewport.is_empty());
    assert!(viewport.surface().is_empty());
}

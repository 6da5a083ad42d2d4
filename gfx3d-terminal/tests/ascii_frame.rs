use gfx3d_core::{Color, Matrix3D, PolygonDescriptor, Scheduler, Viewport, ViewportConfig};
use gfx3d_terminal::AsciiRenderer;
use nalgebra::Point3;

fn square(x: f64, y: f64, size: f64, z: f64) -> PolygonDescriptor {
    PolygonDescriptor::new(vec![
        Point3::new(x, y, z),
        Point3::new(x + size, y, z),
        Point3::new(x + size, y + size, z),
        Point3::new(x, y + size, z),
    ])
}

fn viewport(scheduler: Scheduler) -> Viewport<AsciiRenderer> {
    let config = ViewportConfig::default().with_size(40, 40).with_scheduler(scheduler);
    Viewport::with_config(AsciiRenderer::new(40, 40), config)
}

#[test]
fn test_polygon_fills_its_screen_footprint() {
    let mut viewport = viewport(Scheduler::ZOrder);
    let id = viewport.create_polygon(square(10.0, 10.0, 20.0, 0.0)).unwrap();
    viewport.object_mut(id).unwrap().set_fill(Color::WHITE);
    viewport.render().unwrap();

    let renderer = viewport.surface_mut();
    renderer.rasterize();
    assert_eq!(renderer.cell(10, 10), Some(Color::WHITE));
    assert_eq!(renderer.cell(29, 29), Some(Color::WHITE));
    assert_eq!(renderer.cell(30, 20), None);
    assert_eq!(renderer.cell(5, 5), None);
    assert_eq!(renderer.rows()[20].trim(), "@".repeat(20));
}

#[test]
fn test_nearer_polygon_covers_farther_one() {
    for scheduler in [Scheduler::ZOrder, Scheduler::Bsp] {
        let mut viewport = viewport(scheduler);
        // Created near first: the scheduler has to reorder them
        let near = viewport.create_polygon(square(15.0, 5.0, 20.0, 5.0)).unwrap();
        let far = viewport.create_polygon(square(5.0, 15.0, 20.0, 0.0)).unwrap();
        viewport.object_mut(near).unwrap().set_fill(Color::RED);
        viewport.object_mut(far).unwrap().set_fill(Color::BLUE);
        viewport.render().unwrap();

        let renderer = viewport.surface_mut();
        renderer.rasterize();
        // Overlap spans world x 15..25 and y 15..25
        assert_eq!(renderer.cell(20, 20), Some(Color::RED));
        assert_eq!(renderer.cell(7, 12), Some(Color::BLUE));
        assert_eq!(renderer.cell(32, 32), Some(Color::RED));
    }
}

#[test]
fn test_camera_change_repaints() {
    let mut viewport = viewport(Scheduler::ZOrder);
    let id = viewport.create_polygon(square(0.0, 0.0, 10.0, 0.0)).unwrap();
    viewport.object_mut(id).unwrap().set_fill(Color::WHITE);
    viewport.render().unwrap();
    viewport.surface_mut().rasterize();
    assert!(viewport.surface().cell(5, 35).is_some());
    assert!(viewport.surface().cell(25, 15).is_none());

    viewport.set_camera_transform(Matrix3D::translate(20.0, 20.0, 0.0));
    viewport.render().unwrap();
    viewport.surface_mut().rasterize();
    assert!(viewport.surface().cell(5, 35).is_none());
    assert!(viewport.surface().cell(25, 15).is_some());
}

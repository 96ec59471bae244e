use glam::DVec3;
use kernel_api::{DimTag, ElementType, FieldTag, GeometryKernel, KernelError, Threshold};
use preview_kernel::{Field, PreviewKernel, Shape};

#[test]
fn primitives_have_exact_bounds_and_boundaries() {
    let mut kernel = PreviewKernel::new();
    let sphere = kernel.add_sphere(DVec3::new(1.0, 2.0, 3.0), 0.5).unwrap();
    let cube = kernel.add_box(DVec3::ZERO, DVec3::new(1.0, 2.0, 3.0)).unwrap();
    let cylinder = kernel.add_cylinder(DVec3::new(0.0, 0.0, -1.0), 4.0, 2.0).unwrap();

    let b = kernel.bounding_box(sphere).unwrap();
    assert_eq!(b.min, DVec3::new(0.5, 1.5, 2.5));
    assert_eq!(b.max, DVec3::new(1.5, 2.5, 3.5));
    let b = kernel.bounding_box(cylinder).unwrap();
    assert_eq!(b.min, DVec3::new(-2.0, -2.0, -1.0));
    assert_eq!(b.max, DVec3::new(2.0, 2.0, 3.0));

    assert_eq!(kernel.boundary(sphere).unwrap().len(), 1);
    assert_eq!(kernel.boundary(cube).unwrap().len(), 6);
    assert_eq!(kernel.boundary(cylinder).unwrap().len(), 3);
    assert_eq!(kernel.entities(3), vec![sphere, cube, cylinder]);
    assert_eq!(kernel.entities(2).len(), 10);
}

#[test]
fn degenerate_primitives_are_rejected() {
    let mut kernel = PreviewKernel::new();
    assert!(matches!(
        kernel.add_sphere(DVec3::ZERO, 0.0),
        Err(KernelError::DegenerateGeometry(_))
    ));
    assert!(kernel.add_box(DVec3::ZERO, DVec3::new(1.0, 0.0, 1.0)).is_err());
    assert!(kernel.add_annulus(DVec3::ZERO, 2.0, 1.0).is_err());
}

#[test]
fn unknown_entities_are_reported() {
    let kernel = PreviewKernel::new();
    let missing = DimTag::volume(42);
    assert!(matches!(kernel.boundary(missing), Err(KernelError::InvalidEntity(t)) if t == missing));
}

#[test]
fn surface_mesh_follows_global_size() {
    let mut coarse = PreviewKernel::new();
    let s = coarse.add_sphere(DVec3::ZERO, 1.0).unwrap();
    coarse.set_mesh_size(&[s], 1.0).unwrap();
    coarse.generate_mesh(2).unwrap();

    let mut fine = PreviewKernel::new();
    let s = fine.add_sphere(DVec3::ZERO, 1.0).unwrap();
    fine.set_mesh_size(&[s], 0.1).unwrap();
    fine.generate_mesh(2).unwrap();

    assert!(fine.element_count() > coarse.element_count());
}

#[test]
fn volume_meshing_is_unsupported() {
    let mut kernel = PreviewKernel::new();
    kernel.add_sphere(DVec3::ZERO, 1.0).unwrap();
    assert_eq!(kernel.max_mesh_dim(), 2);
    assert!(matches!(kernel.generate_mesh(3), Err(KernelError::Unsupported(_))));
    // Nothing was meshed by the failed call.
    assert_eq!(kernel.element_count(), 0);
}

#[test]
fn remeshing_keeps_existing_meshes() {
    let mut kernel = PreviewKernel::new();
    kernel.add_sphere(DVec3::ZERO, 1.0).unwrap();
    kernel.generate_mesh(2).unwrap();
    let (nodes, elements) = (kernel.node_count(), kernel.element_count());
    kernel.generate_mesh(2).unwrap();
    assert_eq!((kernel.node_count(), kernel.element_count()), (nodes, elements));
}

#[test]
fn sizing_fields_chain_points_to_background() {
    let mut kernel = PreviewKernel::new();
    let point = kernel.add_point(DVec3::ZERO, 0.1).unwrap();
    let distance = kernel.add_distance_field(&[point]).unwrap();
    let threshold = kernel
        .add_threshold_field(&Threshold {
            input: distance,
            size_min: 0.1,
            size_max: 0.5,
            dist_min: 1.0,
            dist_max: 2.0,
        })
        .unwrap();
    let min = kernel.add_min_field(&[threshold]).unwrap();
    kernel.set_background_field(min).unwrap();

    assert!(matches!(
        kernel.field(distance),
        Some(Field::Distance { points, .. }) if points == &vec![point]
    ));
    assert_eq!(kernel.size_at(DVec3::new(0.5, 0.0, 0.0)).unwrap(), 0.1);
    assert_eq!(kernel.size_at(DVec3::new(3.0, 0.0, 0.0)).unwrap(), 0.5);
}

#[test]
fn distance_fields_need_points() {
    let mut kernel = PreviewKernel::new();
    let sphere = kernel.add_sphere(DVec3::ZERO, 1.0).unwrap();
    assert!(matches!(kernel.add_distance_field(&[sphere]), Err(KernelError::InvalidEntity(_))));
    assert!(matches!(
        kernel.set_background_field(FieldTag(7)),
        Err(KernelError::UnknownField(FieldTag(7)))
    ));
}

#[test]
fn slice_splits_boxes_exactly() {
    let mut kernel = PreviewKernel::new();
    let cube = kernel.add_box(DVec3::ZERO, DVec3::new(1.0, 1.0, 4.0)).unwrap();
    let sphere = kernel.add_sphere(DVec3::new(5.0, 0.0, 1.0), 0.5).unwrap();

    let pieces = kernel.slice(&[cube, sphere], 1.0).unwrap();
    assert_eq!(pieces.len(), 3);
    assert!(kernel.shape(cube).is_none());
    let lower = kernel.bounding_box(pieces[0]).unwrap();
    let upper = kernel.bounding_box(pieces[1]).unwrap();
    assert_eq!((lower.min.z, lower.max.z), (0.0, 1.0));
    assert_eq!((upper.min.z, upper.max.z), (1.0, 4.0));
    assert_eq!(pieces[2], sphere);
    assert!(matches!(kernel.shape(sphere), Some(Shape::Sphere { .. })));
}

#[test]
fn cut_drops_swallowed_objects_and_tools() {
    let mut kernel = PreviewKernel::new();
    let inside = kernel.add_sphere(DVec3::new(0.0, 0.0, -1.0), 0.4).unwrap();
    let outside = kernel.add_sphere(DVec3::new(0.0, 0.0, 3.0), 0.4).unwrap();
    let tool = kernel.add_cylinder(DVec3::new(0.0, 0.0, -2.0), 2.0, 1.0).unwrap();

    let kept = kernel.cut(&[inside, outside], &[tool]).unwrap();
    assert_eq!(kept, vec![outside]);
    assert_eq!(kernel.entities(3), vec![outside]);
    // The swallowed sphere's surface went with it.
    assert_eq!(kernel.entities(2), kernel.boundary(outside).unwrap());
}

#[test]
fn volume_from_shells_spans_outer_shell() {
    let mut kernel = PreviewKernel::new();
    let cube = kernel.add_box(DVec3::splat(-2.0), DVec3::splat(4.0)).unwrap();
    let bead = kernel.add_sphere(DVec3::ZERO, 1.0).unwrap();
    let shell = kernel.boundary(cube).unwrap();
    let hole = kernel.boundary(bead).unwrap();
    kernel.remove(&[cube, bead], false).unwrap();

    let volume = kernel.add_volume(&shell, &[hole.clone()]).unwrap();
    let bounds = kernel.bounding_box(volume).unwrap();
    assert_eq!(bounds.min, DVec3::splat(-2.0));
    assert_eq!(kernel.boundary(volume).unwrap().len(), 7);
    assert!(kernel.boundary(volume).unwrap().contains(&hole[0]));
}

#[test]
fn periodic_slave_copies_master_mesh() {
    let mut kernel = PreviewKernel::new();
    let cube = kernel.add_box(DVec3::ZERO, DVec3::new(2.0, 1.0, 1.0)).unwrap();
    let faces = kernel.boundary(cube).unwrap();
    let (xmin, xmax) = (faces[0], faces[1]);

    assert!(kernel.set_periodic(&[xmax], &[faces[2]], DVec3::X * 2.0).is_err());
    kernel.set_periodic(&[xmax], &[xmin], DVec3::X * 2.0).unwrap();
    kernel.generate_mesh(2).unwrap();

    let master = kernel.nodes(xmin, false).unwrap();
    let slave = kernel.nodes(xmax, false).unwrap();
    assert_eq!(master.len(), slave.len());
    for (m, s) in master.coords.iter().zip(&slave.coords) {
        assert_eq!(*m + DVec3::X * 2.0, *s);
    }
    assert!(master.tags.iter().all(|t| !slave.tags.contains(t)));
}

#[test]
fn write_vtk_with_physical_groups() {
    let dir = tempfile::tempdir().unwrap();
    let mut kernel = PreviewKernel::new();
    let a = kernel.add_sphere(DVec3::ZERO, 1.0).unwrap();
    let b = kernel.add_sphere(DVec3::X * 3.0, 1.0).unwrap();
    kernel.generate_mesh(2).unwrap();

    let surface_a = kernel.boundary(a).unwrap()[0];
    let group = kernel.add_physical_group(2, &[surface_a.tag], "bed").unwrap();
    assert_eq!(group, 1);
    let only_a = kernel.elements(surface_a).unwrap()[0].len();

    let path = dir.path().join("bed.vtk");
    kernel.write(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains(&format!("CELLS {only_a} ")));

    kernel.clear_physical_groups();
    let all = dir.path().join("all.stl");
    kernel.write(&all).unwrap();
    let text = std::fs::read_to_string(&all).unwrap();
    let surface_b = kernel.boundary(b).unwrap()[0];
    let total = only_a + kernel.elements(surface_b).unwrap()[0].len();
    assert_eq!(text.matches("facet normal").count(), total);
}

#[test]
fn physical_groups_need_existing_entities() {
    let mut kernel = PreviewKernel::new();
    assert!(kernel.add_physical_group(2, &[1], "wall").is_err());
    let wall = kernel.add_cylinder_wall(DVec3::ZERO, 1.0, 1.0).unwrap();
    assert!(kernel.add_physical_group(2, &[wall.tag], "wall").is_ok());
    assert_eq!(kernel.physical_groups()[0].name, "wall");
}

#[test]
fn added_elements_must_match_entity_dimension() {
    let mut kernel = PreviewKernel::new();
    let surface = kernel.add_discrete_entity(2, &[]).unwrap();
    let nodes = kernel_api::NodeBlock {
        tags: vec![1, 2, 3, 4],
        coords: vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z],
    };
    kernel.add_nodes(surface, &nodes).unwrap();
    let tets = kernel_api::ElementBlock {
        element_type: ElementType::Tetrahedron,
        tags: vec![1],
        nodes: vec![1, 2, 3, 4],
    };
    assert!(matches!(kernel.add_elements(surface, &tets), Err(KernelError::MeshMismatch(_))));
}

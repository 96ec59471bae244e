//! # Tests for the Column Phase Machine

use super::*;
use config::{ContainerConfig, ContainerShape, RefRadius};
use kernel_api::TagOffsets;
use packed_bed::Bead;
use preview_kernel::PreviewKernel;

fn boxed(inlet: f64) -> Container {
    Container::new(&ContainerConfig {
        shape: ContainerShape::Box,
        size: vec![4.0, 4.0, 4.0],
        inlet_length: inlet,
        ..Default::default()
    })
    .unwrap()
}

fn cylinder(inlet: f64, sections: u32) -> Container {
    Container::new(&ContainerConfig {
        shape: ContainerShape::Cylinder,
        size: vec![3.0, 4.0],
        inlet_length: inlet,
        end_face_sections: sections,
        ..Default::default()
    })
    .unwrap()
}

fn bed(beads: &[(f64, f64, f64)]) -> PackedBed {
    PackedBed::new(beads.iter().map(|(x, y, z)| Bead::new(*x, *y, *z, 0.5)).collect()).unwrap()
}

/// Builds primitives and container solids in a fresh coarse kernel.
fn generic_setup(container: &mut Container, bed: &mut PackedBed) -> PreviewKernel {
    let mut kernel = PreviewKernel::new();
    kernel
        .configure(&config::KernelOptions {
            mesh_size: 1.0,
            ..Default::default()
        })
        .unwrap();
    bed.generate_primitives(&mut kernel).unwrap();
    container.build_geometry(&mut kernel).unwrap();
    kernel
}

fn tagged<K: GeometryKernel>(column: &mut Column<'_>, kernel: &mut K) {
    column.fuse(kernel, FusionMode::Boolean { fragment: true }).unwrap();
    column.partition(kernel).unwrap();
    column.classify_boundary_surfaces(kernel).unwrap();
}

#[test]
fn test_column_needs_container_body() {
    let container = Container::new(&ContainerConfig::default()).unwrap();
    let bed = bed(&[(0.0, 0.0, 0.0)]);
    assert!(matches!(Column::new(&container, &bed), Err(MesherError::UnsupportedShape(_))));
}

#[test]
fn test_phase_order_is_enforced() {
    let (mut container, mut bed) = (boxed(0.0), bed(&[(0.0, 0.0, 2.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let mut column = Column::new(&container, &bed).unwrap();

    let err = column.mesh(&mut kernel, 2).unwrap_err();
    assert!(matches!(
        err,
        MesherError::Phase { expected: Phase::BoundaryTagged, actual: Phase::Empty, .. }
    ));
    assert!(matches!(column.partition(&mut kernel), Err(MesherError::Phase { .. })));

    column.fuse(&mut kernel, FusionMode::Boolean { fragment: true }).unwrap();
    assert_eq!(column.phase(), Phase::Fused);
    assert!(matches!(
        column.apply_stack_method(&mut kernel, StackMethod::PlaneCut),
        Err(MesherError::Phase { actual: Phase::Fused, .. })
    ));
    assert!(matches!(
        column.fuse(&mut kernel, FusionMode::Boolean { fragment: true }),
        Err(MesherError::Phase { .. })
    ));
}

#[test]
fn test_box_surfaces_are_classified() {
    let (mut container, mut bed) = (boxed(0.0), bed(&[(-1.0, 0.0, 2.0), (1.0, 0.0, 2.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let mut column = Column::new(&container, &bed).unwrap();
    tagged(&mut column, &mut kernel);

    assert_eq!(column.phase(), Phase::BoundaryTagged);
    assert!(column.sections().iter().all(|(_, r)| *r == VolumeRole::Bed));
    assert_eq!(column.surfaces_with(SurfaceRole::Wall).len(), 4);
    assert_eq!(column.surfaces_with(SurfaceRole::InletCap).len(), 1);
    assert_eq!(column.surfaces_with(SurfaceRole::OutletCap).len(), 1);
    assert_eq!(column.surfaces_with(SurfaceRole::Bed), bed.shells().concat());

    let names: Vec<&str> = kernel.physical_groups().iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["column", "inlet", "outlet", "wall", "bed"]);
}

#[test]
fn test_fragments_outside_container_are_removed() {
    let (mut container, mut bed) = (boxed(0.0), bed(&[(0.0, 0.0, 2.0), (0.0, 0.0, 10.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let outside = bed.volumes()[1];
    let mut column = Column::new(&container, &bed).unwrap();
    column.fuse(&mut kernel, FusionMode::Boolean { fragment: true }).unwrap();

    assert_eq!(column.volumes().len(), 2);
    assert!(!kernel.entities(3).contains(&outside));
}

#[test]
fn test_unfragmented_solids_are_kept() {
    let (mut container, mut bed) = (boxed(0.0), bed(&[(0.0, 0.0, 2.0), (0.0, 0.0, 10.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let mut column = Column::new(&container, &bed).unwrap();
    column.fuse(&mut kernel, FusionMode::Boolean { fragment: false }).unwrap();
    assert_eq!(column.volumes().len(), 3);
}

#[test]
fn test_inlet_section_caps() {
    let (mut container, mut bed) = (cylinder(1.0, 1), bed(&[(0.0, 0.0, 2.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let mut column = Column::new(&container, &bed).unwrap();
    tagged(&mut column, &mut kernel);

    let inlet_volume = container.sections()[1].0;
    assert!(column.sections().contains(&(inlet_volume, VolumeRole::Inlet)));

    let mut inlet_roles: Vec<SurfaceRole> = column
        .surfaces()
        .iter()
        .filter(|s| s.section == VolumeRole::Inlet)
        .map(|s| s.role)
        .collect();
    inlet_roles.sort();
    assert_eq!(inlet_roles, vec![SurfaceRole::InletCap, SurfaceRole::OutletCap, SurfaceRole::Wall]);
}

#[test]
fn test_volume_cut_drops_beads_in_extensions() {
    let (mut container, mut bed) = (cylinder(2.0, 1), bed(&[(0.0, 0.0, -1.0), (0.0, 0.0, 2.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let swallowed = bed.volumes()[0];
    let mut column = Column::new(&container, &bed).unwrap();
    column.apply_stack_method(&mut kernel, StackMethod::VolumeCut).unwrap();

    assert!(!kernel.entities(3).contains(&swallowed));
    // Body, inlet and the remaining bead; the cutting tool is consumed.
    assert_eq!(kernel.entities(3).len(), 3);
    assert_eq!(column.phase(), Phase::Empty);
}

#[test]
fn test_plane_cut_keeps_inner_beads() {
    let (mut container, mut bed) = (boxed(0.0), bed(&[(0.0, 0.0, 1.0), (0.0, 0.0, 3.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let mut column = Column::new(&container, &bed).unwrap();
    column.apply_stack_method(&mut kernel, StackMethod::All).unwrap();
    tagged(&mut column, &mut kernel);
    assert_eq!(column.surfaces_with(SurfaceRole::Bed).len(), 2);
}

#[test]
fn test_box_periodicity_links_opposite_faces() {
    let (mut container, mut bed) = (boxed(0.0), bed(&[(0.0, 0.0, 2.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let mut column = Column::new(&container, &bed).unwrap();
    tagged(&mut column, &mut kernel);

    let periodicity = Periodicity::try_from("xz".to_string()).unwrap();
    column.apply_periodicity(&mut kernel, periodicity).unwrap();

    let links = kernel.periodic_links().to_vec();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].translation, DVec3::new(4.0, 0.0, 0.0));
    assert_eq!(links[1].translation, DVec3::new(0.0, 0.0, 4.0));

    column.mesh(&mut kernel, 2).unwrap();
    let master = kernel.nodes(links[0].master, false).unwrap();
    let slave = kernel.nodes(links[0].slave, false).unwrap();
    assert_eq!(master.len(), slave.len());
}

#[test]
fn test_cylinder_periodicity_is_unsupported() {
    let (mut container, mut bed) = (cylinder(0.0, 1), bed(&[(0.0, 0.0, 2.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let mut column = Column::new(&container, &bed).unwrap();
    tagged(&mut column, &mut kernel);

    let err = column
        .apply_periodicity(&mut kernel, Periodicity { x: true, ..Default::default() })
        .unwrap_err();
    assert!(matches!(err, MesherError::UnsupportedConfig(_)));
    // No periodicity requested is always fine.
    column.apply_periodicity(&mut kernel, Periodicity::default()).unwrap();
}

#[test]
fn test_write_single_file_with_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let output = OutputConfig {
        filename: dir.path().join("bed.vtk"),
        fragment_format: "stl".into(),
        ..Default::default()
    };
    let (mut container, mut bed) = (boxed(0.0), bed(&[(0.0, 0.0, 2.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let mut column = Column::new(&container, &bed).unwrap();
    tagged(&mut column, &mut kernel);
    column.mesh(&mut kernel, 2).unwrap();

    let written = column.write(&mut kernel, &output, false, true).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "bed_column.vtk",
            "bed_column_inlet.stl",
            "bed_column_outlet.stl",
            "bed_column_wall.stl",
            "bed_column_bed.stl",
        ]
    );
    assert!(written.iter().all(|p| p.exists()));
    assert_eq!(column.phase(), Phase::Written);
    // The column-wide groups are restored after export.
    assert_eq!(kernel.physical_groups().len(), 5);
}

#[test]
fn test_linked_write_splits_sections() {
    let dir = tempfile::tempdir().unwrap();
    let output = OutputConfig {
        filename: dir.path().join("run.vtk"),
        ..Default::default()
    };
    let (mut container, mut bed) = (cylinder(1.0, 1), bed(&[(0.0, 0.0, 2.0)]));
    let mut kernel = generic_setup(&mut container, &mut bed);
    let mut column = Column::new(&container, &bed).unwrap();
    tagged(&mut column, &mut kernel);
    column.mesh(&mut kernel, 2).unwrap();

    let written = column.write(&mut kernel, &output, true, false).unwrap();
    assert_eq!(written, vec![dir.path().join("run_inlet.vtk"), dir.path().join("run_column.vtk")]);
    assert!(matches!(
        column.write(&mut kernel, &output, true, false),
        Err(MesherError::Phase { actual: Phase::Written, .. })
    ));
}

#[test]
fn test_discrete_fusion_of_copied_meshes() {
    let mut kernel = PreviewKernel::new();
    let mut container = cylinder(0.0, 2);
    let mut bed = bed(&[(0.0, 0.0, 2.0), (1.5, 0.0, 2.0)]);
    let offsets = bed
        .copy_reference_mesh(&mut kernel, TagOffsets::default(), 2, RefRadius::Avg)
        .unwrap();
    container.copy_reference_mesh(&mut kernel, offsets).unwrap();

    let mut column = Column::new(&container, &bed).unwrap();
    column.fuse(&mut kernel, FusionMode::Discrete).unwrap();
    assert_eq!(column.volumes().len(), 1);
    column.partition(&mut kernel).unwrap();
    column.classify_boundary_surfaces(&mut kernel).unwrap();

    assert_eq!(column.surfaces_with(SurfaceRole::Wall).len(), 1);
    assert_eq!(column.surfaces_with(SurfaceRole::InletCap).len(), 2);
    assert_eq!(column.surfaces_with(SurfaceRole::OutletCap).len(), 2);
    assert_eq!(column.surfaces_with(SurfaceRole::Bed).len(), 2);
}

#[test]
fn test_discrete_fusion_needs_copied_shell() {
    let mut kernel = PreviewKernel::new();
    let container = cylinder(0.0, 1);
    let bed = bed(&[(0.0, 0.0, 2.0)]);
    let mut column = Column::new(&container, &bed).unwrap();
    assert!(matches!(
        column.fuse(&mut kernel, FusionMode::Discrete),
        Err(MesherError::UnsupportedConfig(_))
    ));
}

#[test]
fn test_shared_interface_belongs_to_lower_section() {
    let container = cylinder(1.0, 1);
    let bed = bed(&[(0.0, 0.0, 2.0)]);
    let mut kernel = PreviewKernel::new();

    // Bed section first so that it carries the lower volume tag.
    let interface = kernel.add_annulus(DVec3::ZERO, 0.0, 3.0).unwrap();
    let top = kernel.add_annulus(DVec3::Z * 4.0, 0.0, 3.0).unwrap();
    let bed_wall = kernel.add_cylinder_wall(DVec3::ZERO, 4.0, 3.0).unwrap();
    let bed_volume = kernel.add_volume(&[bed_wall, interface, top], &[]).unwrap();
    let bottom = kernel.add_annulus(DVec3::Z * -1.0, 0.0, 3.0).unwrap();
    let inlet_wall = kernel.add_cylinder_wall(DVec3::Z * -1.0, 1.0, 3.0).unwrap();
    let inlet_volume = kernel.add_volume(&[inlet_wall, bottom, interface], &[]).unwrap();
    assert!(bed_volume.tag < inlet_volume.tag);

    let mut column = Column::new(&container, &bed).unwrap();
    column.fuse(&mut kernel, FusionMode::Boolean { fragment: false }).unwrap();
    column.partition(&mut kernel).unwrap();
    column.classify_boundary_surfaces(&mut kernel).unwrap();

    let shared = column
        .surfaces()
        .iter()
        .find(|s| s.surface == interface)
        .copied()
        .unwrap();
    assert_eq!(shared.section, VolumeRole::Inlet);
    assert_eq!(shared.role, SurfaceRole::OutletCap);
    assert_eq!(column.surfaces().iter().filter(|s| s.surface == interface).count(), 1);

    let bed_top = column.surfaces().iter().find(|s| s.surface == top).unwrap();
    assert_eq!((bed_top.section, bed_top.role), (VolumeRole::Bed, SurfaceRole::OutletCap));
}

use std::collections::HashSet;

use glam::DVec3;
use kernel_api::{GeometryKernel, KernelError, MeshTemplate, NodeTag, TagOffsets};
use preview_kernel::PreviewKernel;

fn meshed_reference(kernel: &mut PreviewKernel) -> (Vec<kernel_api::DimTag>, MeshTemplate) {
    let sphere = kernel.add_sphere(DVec3::ZERO, 1.0).unwrap();
    let surfaces = kernel.boundary(sphere).unwrap();
    kernel.remove(&[sphere], false).unwrap();
    kernel.generate_mesh(2).unwrap();
    let template = MeshTemplate::capture(kernel, &surfaces, DVec3::ZERO).unwrap();
    (surfaces, template)
}

#[test]
fn stamps_translate_and_shift_tags() {
    let mut kernel = PreviewKernel::new();
    let (surfaces, template) = meshed_reference(&mut kernel);
    let reference = kernel.nodes(surfaces[0], false).unwrap();

    let target = kernel.add_discrete_entity(2, &[]).unwrap();
    let offsets = template
        .stamp(&mut kernel, &[target], DVec3::new(5.0, 0.0, 0.0), TagOffsets::default())
        .unwrap();

    let copy = kernel.nodes(target, false).unwrap();
    assert_eq!(copy.len(), reference.len());
    for (r, c) in reference.coords.iter().zip(&copy.coords) {
        assert_eq!(*r + DVec3::new(5.0, 0.0, 0.0), *c);
    }
    let span = template.node_span();
    for (r, c) in reference.tags.iter().zip(&copy.tags) {
        assert_eq!(*c, *r + span);
    }
    assert_eq!(offsets.node, 2 * span);
    assert_eq!(offsets.element, 2 * template.element_span());
}

#[test]
fn consecutive_stamps_never_overlap() {
    let mut kernel = PreviewKernel::new();
    let (_, template) = meshed_reference(&mut kernel);

    let mut offsets = TagOffsets::default();
    let reference = kernel.nodes(kernel.entities(2)[0], false).unwrap();
    let mut seen: HashSet<NodeTag> = reference.tags.into_iter().collect();
    for i in 1..=5 {
        let target = kernel.add_discrete_entity(2, &[]).unwrap();
        offsets = template
            .stamp(&mut kernel, &[target], DVec3::new(3.0 * i as f64, 0.0, 0.0), offsets)
            .unwrap();
        for tag in kernel.nodes(target, false).unwrap().tags {
            assert!(seen.insert(tag), "node tag {tag} reused");
        }
    }
    assert_eq!(kernel.max_node_tag(), offsets.node);
}

#[test]
fn stale_offsets_are_lifted_past_kernel_tags() {
    let mut kernel = PreviewKernel::new();
    let (_, template) = meshed_reference(&mut kernel);
    let target = kernel.add_discrete_entity(2, &[]).unwrap();

    // Offsets behind the kernel's own tags must not cause collisions.
    let offsets = template
        .stamp(&mut kernel, &[target], DVec3::Z, TagOffsets::new(1, 1))
        .unwrap();
    assert!(offsets.node >= 2 * template.node_span());
}

#[test]
fn colliding_tags_are_rejected() {
    let mut kernel = PreviewKernel::new();
    let (surfaces, _) = meshed_reference(&mut kernel);
    let nodes = kernel.nodes(surfaces[0], false).unwrap();
    let target = kernel.add_discrete_entity(2, &[]).unwrap();
    assert!(matches!(
        kernel.add_nodes(target, &nodes),
        Err(KernelError::TagCollision { kind: "node", .. })
    ));
}

#[test]
fn target_count_must_match_template() {
    let mut kernel = PreviewKernel::new();
    let (_, template) = meshed_reference(&mut kernel);
    let a = kernel.add_discrete_entity(2, &[]).unwrap();
    let b = kernel.add_discrete_entity(2, &[]).unwrap();
    let err = template.stamp(&mut kernel, &[a, b], DVec3::ZERO, TagOffsets::default());
    assert!(matches!(err, Err(KernelError::MeshMismatch(_))));
}

#[test]
fn unmeshed_reference_cannot_be_captured() {
    let mut kernel = PreviewKernel::new();
    let sphere = kernel.add_sphere(DVec3::ZERO, 1.0).unwrap();
    let surfaces = kernel.boundary(sphere).unwrap();
    assert!(MeshTemplate::capture(&kernel, &surfaces, DVec3::ZERO).is_err());
}

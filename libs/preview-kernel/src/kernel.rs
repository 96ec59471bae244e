//! # Preview Kernel
//!
//! [`GeometryKernel`] implementation holding the whole model in memory.
//!
//! Surfaces are tessellated analytically; volumes are never meshed (volume
//! meshes only enter the model through `add_nodes`/`add_elements`). Booleans
//! are non-conformal: entities keep their own geometry, `cut` drops objects
//! swallowed by a tool, and `slice` splits boxes and cylinders exactly.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use config::constants::GEOMETRY_TOLERANCE;
use config::KernelOptions;
use glam::DVec3;
use kernel_api::{
    Aabb, DimTag, ElementBlock, ElementTag, ElementType, FieldTag, GeometryKernel, KernelError,
    KernelResult, NodeBlock, NodeTag, Threshold,
};
use tracing::{debug, info, warn};

use crate::entity::{Entity, Shape};
use crate::export::{write_mesh, Cell};
use crate::field::{evaluate, Field};
use crate::tessellate::Patch;

/// A named set of entities of one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalGroup {
    pub tag: i32,
    pub dim: u8,
    pub entities: Vec<i32>,
    pub name: String,
}

/// `slave` carries the mesh of `master` shifted by `translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicLink {
    pub slave: DimTag,
    pub master: DimTag,
    pub translation: DVec3,
}

/// In-memory geometry kernel.
#[derive(Debug, Clone)]
pub struct PreviewKernel {
    options: KernelOptions,
    entities: BTreeMap<DimTag, Entity>,
    last_tag: [i32; 4],
    fields: BTreeMap<FieldTag, Field>,
    background: Option<FieldTag>,
    coords: BTreeMap<NodeTag, DVec3>,
    element_tags: BTreeSet<ElementTag>,
    periodic: Vec<PeriodicLink>,
    groups: Vec<PhysicalGroup>,
}

impl Default for PreviewKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewKernel {
    /// Creates an empty model with default options.
    pub fn new() -> Self {
        Self {
            options: KernelOptions::default(),
            entities: BTreeMap::new(),
            last_tag: [0; 4],
            fields: BTreeMap::new(),
            background: None,
            coords: BTreeMap::new(),
            element_tags: BTreeSet::new(),
            periodic: Vec::new(),
            groups: Vec::new(),
        }
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    pub fn options(&self) -> &KernelOptions {
        &self.options
    }

    pub fn shape(&self, entity: DimTag) -> Option<&Shape> {
        self.entities.get(&entity).map(|e| &e.shape)
    }

    /// Size prescribed on an entity with `set_mesh_size`.
    pub fn mesh_size(&self, entity: DimTag) -> Option<f64> {
        self.entities.get(&entity).and_then(|e| e.mesh_size)
    }

    pub fn field(&self, tag: FieldTag) -> Option<&Field> {
        self.fields.get(&tag)
    }

    pub fn background_field(&self) -> Option<FieldTag> {
        self.background
    }

    pub fn physical_groups(&self) -> &[PhysicalGroup] {
        &self.groups
    }

    pub fn periodic_links(&self) -> &[PeriodicLink] {
        &self.periodic
    }

    pub fn node_count(&self) -> usize {
        self.coords.len()
    }

    pub fn element_count(&self) -> usize {
        self.element_tags.len()
    }

    /// Evaluates the background field at a point.
    pub fn size_at(&self, at: DVec3) -> KernelResult<f64> {
        match self.background {
            Some(field) => evaluate(&self.fields, field, at),
            None => Ok(self.options.mesh_size),
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn entity(&self, tag: DimTag) -> KernelResult<&Entity> {
        self.entities.get(&tag).ok_or(KernelError::InvalidEntity(tag))
    }

    fn insert(&mut self, dim: u8, entity: Entity) -> DimTag {
        let slot = &mut self.last_tag[dim as usize];
        *slot += 1;
        let tag = DimTag::new(dim, *slot);
        self.entities.insert(tag, entity);
        tag
    }

    /// Adds a solid together with its bounding surfaces.
    fn insert_solid(&mut self, shape: Shape) -> DimTag {
        let surfaces: Vec<Shape> = match shape {
            Shape::Sphere { center, radius } => vec![Shape::SphereSurface { center, radius }],
            Shape::Box { min, extent } => {
                let (ex, ey, ez) = (DVec3::X * extent.x, DVec3::Y * extent.y, DVec3::Z * extent.z);
                vec![
                    Shape::Quad { origin: min, u: ey, v: ez },
                    Shape::Quad { origin: min + ex, u: ey, v: ez },
                    Shape::Quad { origin: min, u: ex, v: ez },
                    Shape::Quad { origin: min + ey, u: ex, v: ez },
                    Shape::Quad { origin: min, u: ex, v: ey },
                    Shape::Quad { origin: min + ez, u: ex, v: ey },
                ]
            }
            Shape::Cylinder { base, height, radius } => vec![
                Shape::CylinderWall { base, height, radius },
                Shape::Annulus { center: base, inner: 0.0, outer: radius },
                Shape::Annulus {
                    center: base + DVec3::Z * height,
                    inner: 0.0,
                    outer: radius,
                },
            ],
            _ => Vec::new(),
        };
        let boundary = surfaces
            .into_iter()
            .map(|s| self.insert(2, Entity::new(s, Vec::new())))
            .collect();
        self.insert(3, Entity::new(shape, boundary))
    }

    /// `entity` followed by its boundary closure, without duplicates.
    fn closure(&self, entity: DimTag) -> KernelResult<Vec<DimTag>> {
        let mut out = vec![entity];
        let mut seen: HashSet<DimTag> = HashSet::from([entity]);
        let mut i = 0;
        while i < out.len() {
            for b in &self.entity(out[i])?.boundary {
                if seen.insert(*b) {
                    out.push(*b);
                }
            }
            i += 1;
        }
        Ok(out)
    }

    fn is_referenced(&self, entity: DimTag) -> bool {
        self.entities.values().any(|e| e.boundary.contains(&entity))
    }

    /// Element size used when tessellating `entity`.
    fn size_for(&self, entity: &Entity) -> KernelResult<f64> {
        if let Some(size) = entity.mesh_size {
            return Ok(size);
        }
        match (self.background, entity.shape.sample_point()) {
            (Some(field), Some(at)) => evaluate(&self.fields, field, at),
            _ => Ok(self.options.mesh_size),
        }
    }

    fn mesh_patch(&mut self, entity: DimTag, patch: Patch) -> KernelResult<()> {
        let first_node = self.max_node_tag() + 1;
        let first_element = self.max_element_tag() + 1;
        let nodes = NodeBlock {
            tags: (0..patch.vertices.len() as u64).map(|i| first_node + i).collect(),
            coords: patch.vertices,
        };
        let mut block = ElementBlock::new(ElementType::Triangle);
        for (k, tri) in patch.triangles.iter().enumerate() {
            block.tags.push(first_element + k as u64);
            block.nodes.extend(tri.iter().map(|i| first_node + *i as u64));
        }
        self.add_nodes(entity, &nodes)?;
        self.add_elements(entity, &block)
    }

    /// Copies the mesh of a periodic master onto its slave.
    fn mesh_periodic(&mut self, link: PeriodicLink) -> KernelResult<()> {
        let master = self.entity(link.master)?;
        let first_node = self.max_node_tag() + 1;
        let mut first_element = self.max_element_tag() + 1;

        let renumber: BTreeMap<NodeTag, NodeTag> = master
            .nodes
            .tags
            .iter()
            .enumerate()
            .map(|(i, t)| (*t, first_node + i as u64))
            .collect();
        let nodes = NodeBlock {
            tags: master.nodes.tags.iter().map(|t| renumber[t]).collect(),
            coords: master.nodes.coords.iter().map(|c| *c + link.translation).collect(),
        };
        let mut blocks = Vec::with_capacity(master.elements.len());
        for block in &master.elements {
            let mut copy = ElementBlock::new(block.element_type);
            for node in &block.nodes {
                let mapped = renumber.get(node).copied().ok_or_else(|| {
                    KernelError::mismatch(format!(
                        "periodic master {} references boundary node {node}",
                        link.master
                    ))
                })?;
                copy.nodes.push(mapped);
            }
            copy.tags = (0..block.len() as u64).map(|i| first_element + i).collect();
            first_element += block.len() as u64;
            blocks.push(copy);
        }

        self.add_nodes(link.slave, &nodes)?;
        for block in &blocks {
            self.add_elements(link.slave, block)?;
        }
        Ok(())
    }

    fn check_positive(what: &str, value: f64) -> KernelResult<()> {
        if value > 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(KernelError::degenerate(format!("{what} must be positive, got {value}")))
        }
    }
}

impl GeometryKernel for PreviewKernel {
    fn configure(&mut self, options: &KernelOptions) -> KernelResult<()> {
        Self::check_positive("mesh size", options.mesh_size)?;
        for (name, value) in &options.raw {
            debug!(name = %name, value, "Ignoring raw kernel option");
        }
        debug!(
            algorithm_2d = options.algorithm_2d,
            algorithm_3d = options.algorithm_3d,
            workers = options.worker_count,
            mesh_size = options.mesh_size,
            "Configured preview kernel"
        );
        self.options = options.clone();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Primitives
    // -------------------------------------------------------------------------

    fn add_point(&mut self, position: DVec3, mesh_size: f64) -> KernelResult<DimTag> {
        let mut entity = Entity::new(Shape::Point { position }, Vec::new());
        entity.mesh_size = Some(mesh_size);
        Ok(self.insert(0, entity))
    }

    fn add_sphere(&mut self, center: DVec3, radius: f64) -> KernelResult<DimTag> {
        Self::check_positive("sphere radius", radius)?;
        Ok(self.insert_solid(Shape::Sphere { center, radius }))
    }

    fn add_box(&mut self, min: DVec3, extent: DVec3) -> KernelResult<DimTag> {
        for v in extent.to_array() {
            Self::check_positive("box extent", v)?;
        }
        Ok(self.insert_solid(Shape::Box { min, extent }))
    }

    fn add_cylinder(&mut self, base: DVec3, height: f64, radius: f64) -> KernelResult<DimTag> {
        Self::check_positive("cylinder height", height)?;
        Self::check_positive("cylinder radius", radius)?;
        Ok(self.insert_solid(Shape::Cylinder { base, height, radius }))
    }

    fn add_annulus(&mut self, center: DVec3, inner: f64, outer: f64) -> KernelResult<DimTag> {
        if !(inner >= 0.0 && outer > inner) {
            return Err(KernelError::degenerate(format!(
                "annulus needs 0 <= inner < outer, got {inner}..{outer}"
            )));
        }
        Ok(self.insert(2, Entity::new(Shape::Annulus { center, inner, outer }, Vec::new())))
    }

    fn add_cylinder_wall(&mut self, base: DVec3, height: f64, radius: f64) -> KernelResult<DimTag> {
        Self::check_positive("wall height", height)?;
        Self::check_positive("wall radius", radius)?;
        Ok(self.insert(2, Entity::new(Shape::CylinderWall { base, height, radius }, Vec::new())))
    }

    fn add_discrete_entity(&mut self, dim: u8, boundary: &[DimTag]) -> KernelResult<DimTag> {
        if dim > 3 {
            return Err(KernelError::unsupported(format!("entities of dimension {dim}")));
        }
        for b in boundary {
            self.entity(*b)?;
            if b.dim + 1 != dim {
                return Err(KernelError::mismatch(format!(
                    "boundary {b} of a dimension-{dim} entity"
                )));
            }
        }
        Ok(self.insert(dim, Entity::new(Shape::Discrete, boundary.to_vec())))
    }

    fn add_volume(&mut self, shell: &[DimTag], holes: &[Vec<DimTag>]) -> KernelResult<DimTag> {
        if shell.is_empty() {
            return Err(KernelError::degenerate("volume without outer shell"));
        }
        let mut boundary = shell.to_vec();
        boundary.extend(holes.iter().flatten().copied());
        for b in &boundary {
            self.entity(*b)?;
            if b.dim != 2 {
                return Err(KernelError::mismatch(format!("shell entity {b} is not a surface")));
            }
        }
        let outer = shell.to_vec();
        Ok(self.insert(3, Entity::new(Shape::Enclosed { outer }, boundary)))
    }

    fn remove(&mut self, entities: &[DimTag], recursive: bool) -> KernelResult<()> {
        for e in entities {
            self.entity(*e)?;
        }
        let mut queue = entities.to_vec();
        while let Some(tag) = queue.pop() {
            let Some(entity) = self.entities.remove(&tag) else {
                continue;
            };
            for node in &entity.nodes.tags {
                self.coords.remove(node);
            }
            for block in &entity.elements {
                for element in &block.tags {
                    self.element_tags.remove(element);
                }
            }
            if recursive {
                for b in entity.boundary {
                    if !self.is_referenced(b) {
                        queue.push(b);
                    }
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    fn entities(&self, dim: u8) -> Vec<DimTag> {
        self.entities.keys().filter(|t| t.dim == dim).copied().collect()
    }

    fn boundary(&self, entity: DimTag) -> KernelResult<Vec<DimTag>> {
        Ok(self.entity(entity)?.boundary.clone())
    }

    fn bounding_box(&self, entity: DimTag) -> KernelResult<Aabb> {
        let e = self.entity(entity)?;
        if let Some(bounds) = e.shape.bounds() {
            return Ok(bounds);
        }
        if let Shape::Enclosed { outer } = &e.shape {
            return self.union_bounds(outer);
        }
        let nodes = self.nodes(entity, true)?;
        if let Some(bounds) = Aabb::from_points(&nodes.coords) {
            return Ok(bounds);
        }
        self.union_bounds(&e.boundary)
    }

    // -------------------------------------------------------------------------
    // Booleans
    // -------------------------------------------------------------------------

    fn fragment(&mut self, objects: &[DimTag], tools: &[DimTag]) -> KernelResult<Vec<DimTag>> {
        let mut result: Vec<DimTag> = Vec::with_capacity(objects.len() + tools.len());
        for e in objects.iter().chain(tools) {
            self.entity(*e)?;
            if !result.contains(e) {
                result.push(*e);
            }
        }
        let top = result.iter().map(|e| e.dim).max().unwrap_or(0);
        result.retain(|e| e.dim == top);
        warn!(
            entities = result.len(),
            "Preview fragment is non-conformal; entities keep their own boundaries"
        );
        Ok(result)
    }

    fn cut(&mut self, objects: &[DimTag], tools: &[DimTag]) -> KernelResult<Vec<DimTag>> {
        let tool_bounds = tools
            .iter()
            .map(|t| self.bounding_box(*t))
            .collect::<KernelResult<Vec<_>>>()?;

        let mut kept = Vec::with_capacity(objects.len());
        let mut swallowed = Vec::new();
        for object in objects {
            let bounds = self.bounding_box(*object)?;
            let tol = GEOMETRY_TOLERANCE * bounds.extent().max_element().max(1.0);
            if tool_bounds.iter().any(|t| t.contains(&bounds, tol)) {
                swallowed.push(*object);
            } else {
                kept.push(*object);
            }
        }
        if kept.iter().any(|o| {
            let b = self.bounding_box(*o);
            tool_bounds.iter().any(|t| b.as_ref().is_ok_and(|b| overlaps(t, b)))
        }) {
            warn!("Preview cut keeps partially overlapping objects whole");
        }

        debug!(kept = kept.len(), removed = swallowed.len(), "Cut");
        swallowed.extend_from_slice(tools);
        self.remove(&swallowed, true)?;
        Ok(kept)
    }

    fn slice(&mut self, objects: &[DimTag], z: f64) -> KernelResult<Vec<DimTag>> {
        let mut result = Vec::with_capacity(objects.len());
        let mut unsplit = 0usize;
        for object in objects {
            let entity = self.entity(*object)?;
            let straddles = self.bounding_box(*object)?.straddles_z(z);
            match (straddles, entity.shape.split_z(z)) {
                (false, _) => result.push(*object),
                (true, Some((lower, upper))) => {
                    self.remove(&[*object], true)?;
                    result.push(self.insert_solid(lower));
                    result.push(self.insert_solid(upper));
                }
                (true, None) => {
                    unsplit += 1;
                    result.push(*object);
                }
            }
        }
        if unsplit > 0 {
            warn!(z, unsplit, "Preview slice keeps curved solids whole");
        }
        Ok(result)
    }

    // -------------------------------------------------------------------------
    // Mesh sizing
    // -------------------------------------------------------------------------

    fn add_distance_field(&mut self, points: &[DimTag]) -> KernelResult<FieldTag> {
        let mut positions = Vec::with_capacity(points.len());
        for point in points {
            match self.entity(*point)?.shape {
                Shape::Point { position } => positions.push(position),
                _ => return Err(KernelError::InvalidEntity(*point)),
            }
        }
        Ok(self.push_field(Field::Distance {
            points: points.to_vec(),
            positions,
        }))
    }

    fn add_threshold_field(&mut self, threshold: &Threshold) -> KernelResult<FieldTag> {
        if !self.fields.contains_key(&threshold.input) {
            return Err(KernelError::UnknownField(threshold.input));
        }
        Ok(self.push_field(Field::Threshold(*threshold)))
    }

    fn add_min_field(&mut self, fields: &[FieldTag]) -> KernelResult<FieldTag> {
        if let Some(missing) = fields.iter().find(|f| !self.fields.contains_key(*f)) {
            return Err(KernelError::UnknownField(*missing));
        }
        Ok(self.push_field(Field::Min(fields.to_vec())))
    }

    fn set_background_field(&mut self, field: FieldTag) -> KernelResult<()> {
        if !self.fields.contains_key(&field) {
            return Err(KernelError::UnknownField(field));
        }
        self.background = Some(field);
        Ok(())
    }

    fn set_mesh_size(&mut self, entities: &[DimTag], size: f64) -> KernelResult<()> {
        Self::check_positive("mesh size", size)?;
        let mut targets = Vec::new();
        for entity in entities {
            targets.extend(self.closure(*entity)?);
        }
        for target in targets {
            if let Some(e) = self.entities.get_mut(&target) {
                e.mesh_size = Some(size);
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Meshing
    // -------------------------------------------------------------------------

    fn max_mesh_dim(&self) -> u8 {
        2
    }

    fn generate_mesh(&mut self, dim: u8) -> KernelResult<()> {
        if dim > 3 {
            return Err(KernelError::unsupported(format!("meshing to dimension {dim}")));
        }
        if dim == 3 {
            if let Some((tag, _)) = self
                .entities
                .iter()
                .find(|(t, e)| t.dim == 3 && !e.is_meshed())
            {
                return Err(KernelError::unsupported(format!("volume meshing of {tag}")));
            }
        }
        if dim < 2 {
            debug!(dim, "Preview kernel has no curve or point meshes");
            return Ok(());
        }

        let slaves: HashSet<DimTag> = self.periodic.iter().map(|l| l.slave).collect();
        let mut patches = Vec::new();
        for (tag, entity) in &self.entities {
            if tag.dim != 2 || entity.is_meshed() || slaves.contains(tag) {
                continue;
            }
            let size = self.size_for(entity)?;
            if let Some(patch) = entity.shape.tessellate(size) {
                patches.push((*tag, patch));
            }
        }
        let surfaces = patches.len();
        for (tag, patch) in patches {
            self.mesh_patch(tag, patch)?;
        }

        let links: Vec<PeriodicLink> = self.periodic.clone();
        for link in links {
            let pending = !self.entity(link.slave)?.is_meshed();
            if pending && self.entity(link.master)?.is_meshed() {
                self.mesh_periodic(link)?;
            }
        }

        info!(
            dim,
            surfaces,
            nodes = self.node_count(),
            elements = self.element_count(),
            "Generated preview mesh"
        );
        Ok(())
    }

    fn nodes(&self, entity: DimTag, include_boundary: bool) -> KernelResult<NodeBlock> {
        let owners = if include_boundary {
            self.closure(entity)?
        } else {
            self.entity(entity)?;
            vec![entity]
        };
        let mut seen: HashSet<NodeTag> = HashSet::new();
        let mut block = NodeBlock::default();
        for owner in owners {
            let nodes = &self.entity(owner)?.nodes;
            for (tag, coord) in nodes.tags.iter().zip(&nodes.coords) {
                if seen.insert(*tag) {
                    block.tags.push(*tag);
                    block.coords.push(*coord);
                }
            }
        }
        Ok(block)
    }

    fn elements(&self, entity: DimTag) -> KernelResult<Vec<ElementBlock>> {
        Ok(self.entity(entity)?.elements.clone())
    }

    fn add_nodes(&mut self, entity: DimTag, nodes: &NodeBlock) -> KernelResult<()> {
        self.entity(entity)?;
        if nodes.tags.len() != nodes.coords.len() {
            return Err(KernelError::mismatch(format!(
                "{} node tags for {} coordinates",
                nodes.tags.len(),
                nodes.coords.len()
            )));
        }
        let mut fresh: HashSet<NodeTag> = HashSet::with_capacity(nodes.len());
        for tag in &nodes.tags {
            if self.coords.contains_key(tag) || !fresh.insert(*tag) {
                return Err(KernelError::TagCollision { kind: "node", tag: *tag });
            }
        }

        for (tag, coord) in nodes.tags.iter().zip(&nodes.coords) {
            self.coords.insert(*tag, *coord);
        }
        if let Some(e) = self.entities.get_mut(&entity) {
            e.nodes.tags.extend_from_slice(&nodes.tags);
            e.nodes.coords.extend_from_slice(&nodes.coords);
        }
        Ok(())
    }

    fn add_elements(&mut self, entity: DimTag, block: &ElementBlock) -> KernelResult<()> {
        self.entity(entity)?;
        if !block.is_consistent() {
            return Err(KernelError::mismatch("element connectivity length"));
        }
        if block.element_type.dim() != entity.dim {
            return Err(KernelError::mismatch(format!(
                "{:?} elements on {entity}",
                block.element_type
            )));
        }
        let mut fresh: HashSet<ElementTag> = HashSet::with_capacity(block.len());
        for tag in &block.tags {
            if self.element_tags.contains(tag) || !fresh.insert(*tag) {
                return Err(KernelError::TagCollision { kind: "element", tag: *tag });
            }
        }
        if let Some(node) = block.nodes.iter().find(|n| !self.coords.contains_key(n)) {
            return Err(KernelError::mismatch(format!("element references unknown node {node}")));
        }

        self.element_tags.extend(block.tags.iter().copied());
        if let Some(e) = self.entities.get_mut(&entity) {
            match e.elements.iter_mut().find(|b| b.element_type == block.element_type) {
                Some(existing) => {
                    existing.tags.extend_from_slice(&block.tags);
                    existing.nodes.extend_from_slice(&block.nodes);
                }
                None => e.elements.push(block.clone()),
            }
        }
        Ok(())
    }

    fn max_node_tag(&self) -> NodeTag {
        self.coords.last_key_value().map(|(tag, _)| *tag).unwrap_or(0)
    }

    fn max_element_tag(&self) -> ElementTag {
        self.element_tags.last().copied().unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Tagging and export
    // -------------------------------------------------------------------------

    fn set_periodic(
        &mut self,
        slaves: &[DimTag],
        masters: &[DimTag],
        translation: DVec3,
    ) -> KernelResult<()> {
        if slaves.len() != masters.len() {
            return Err(KernelError::mismatch(format!(
                "{} periodic slaves for {} masters",
                slaves.len(),
                masters.len()
            )));
        }
        for (slave, master) in slaves.iter().zip(masters) {
            let expected = self.bounding_box(*master)?.translated(translation);
            let actual = self.bounding_box(*slave)?;
            let tol = GEOMETRY_TOLERANCE * expected.extent().max_element().max(1.0);
            if !(expected.contains(&actual, tol) && actual.contains(&expected, tol)) {
                return Err(KernelError::mismatch(format!(
                    "{slave} is not {master} translated by {translation}"
                )));
            }
            self.periodic.push(PeriodicLink {
                slave: *slave,
                master: *master,
                translation,
            });
        }
        Ok(())
    }

    fn add_physical_group(&mut self, dim: u8, tags: &[i32], name: &str) -> KernelResult<i32> {
        for tag in tags {
            self.entity(DimTag::new(dim, *tag))?;
        }
        let tag = self.groups.iter().map(|g| g.tag).max().unwrap_or(0) + 1;
        self.groups.push(PhysicalGroup {
            tag,
            dim,
            entities: tags.to_vec(),
            name: name.to_string(),
        });
        Ok(tag)
    }

    fn clear_physical_groups(&mut self) {
        self.groups.clear();
    }

    fn write(&mut self, path: &Path) -> KernelResult<()> {
        let mut cells = Vec::new();
        let mut push = |entity: &Entity, group: i32| {
            for block in &entity.elements {
                for i in 0..block.len() {
                    cells.push(Cell {
                        element_type: block.element_type,
                        nodes: block.element_nodes(i).to_vec(),
                        group,
                    });
                }
            }
        };

        if self.groups.is_empty() {
            for entity in self.entities.values() {
                push(entity, 0);
            }
        } else {
            for group in &self.groups {
                for tag in &group.entities {
                    if let Some(entity) = self.entities.get(&DimTag::new(group.dim, *tag)) {
                        push(entity, group.tag);
                    }
                }
            }
        }

        write_mesh(path, &self.coords, &cells)?;
        info!(path = %path.display(), cells = cells.len(), "Wrote mesh");
        Ok(())
    }
}

impl PreviewKernel {
    fn push_field(&mut self, field: Field) -> FieldTag {
        let tag = FieldTag(self.fields.keys().next_back().map(|t| t.0).unwrap_or(0) + 1);
        self.fields.insert(tag, field);
        tag
    }

    fn union_bounds(&self, entities: &[DimTag]) -> KernelResult<Aabb> {
        let mut bounds: Option<Aabb> = None;
        for entity in entities {
            let b = self.bounding_box(*entity)?;
            bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
        }
        bounds.ok_or_else(|| KernelError::degenerate("entity has neither geometry nor mesh"))
    }
}

fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    a.min.cmplt(b.max).all() && b.min.cmplt(a.max).all()
}

//! # Mesh Export
//!
//! Writers for the formats the preview kernel supports, chosen by file
//! extension: VTK legacy ASCII (`.vtk`, all element types, one `group`
//! scalar per cell) and ASCII STL (`.stl`, triangles only).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use glam::DVec3;
use kernel_api::{ElementType, KernelError, KernelResult, NodeTag};

/// One element to export, tagged with the physical group it belongs to
/// (0 when no groups are defined).
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub element_type: ElementType,
    pub nodes: Vec<NodeTag>,
    pub group: i32,
}

/// Writes `cells` to `path` in the format selected by its extension.
pub fn write_mesh(
    path: &Path,
    coords: &BTreeMap<NodeTag, DVec3>,
    cells: &[Cell],
) -> KernelResult<()> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let io_error = |source| KernelError::Io {
        path: path.to_path_buf(),
        source,
    };

    let write: fn(&mut dyn Write, &BTreeMap<NodeTag, DVec3>, &[Cell]) -> io::Result<()> =
        match extension.as_str() {
            "vtk" => write_vtk,
            "stl" => write_stl,
            other => {
                return Err(KernelError::unsupported(format!(
                    "export format '.{other}' (supported: .vtk, .stl)"
                )))
            }
        };

    let file = File::create(path).map_err(io_error)?;
    let mut out = BufWriter::new(file);
    write(&mut out, coords, cells).map_err(io_error)?;
    out.flush().map_err(io_error)
}

fn vtk_cell_type(element_type: ElementType) -> u8 {
    match element_type {
        ElementType::Point => 1,
        ElementType::Line => 3,
        ElementType::Triangle => 5,
        ElementType::Tetrahedron => 10,
    }
}

/// VTK legacy unstructured grid. Only nodes referenced by a cell are written.
pub fn write_vtk(
    out: &mut dyn Write,
    coords: &BTreeMap<NodeTag, DVec3>,
    cells: &[Cell],
) -> io::Result<()> {
    let mut index: BTreeMap<NodeTag, usize> = BTreeMap::new();
    for tag in cells.iter().flat_map(|c| &c.nodes) {
        let next = index.len();
        index.entry(*tag).or_insert(next);
    }
    let mut ordered: Vec<(NodeTag, usize)> = index.iter().map(|(t, i)| (*t, *i)).collect();
    ordered.sort_by_key(|(_, i)| *i);

    writeln!(out, "# vtk DataFile Version 3.0")?;
    writeln!(out, "packmesh preview")?;
    writeln!(out, "ASCII")?;
    writeln!(out, "DATASET UNSTRUCTURED_GRID")?;
    writeln!(out, "POINTS {} double", ordered.len())?;
    for (tag, _) in &ordered {
        let p = coords.get(tag).copied().unwrap_or(DVec3::ZERO);
        writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
    }

    let size: usize = cells.iter().map(|c| c.nodes.len() + 1).sum();
    writeln!(out, "CELLS {} {}", cells.len(), size)?;
    for cell in cells {
        write!(out, "{}", cell.nodes.len())?;
        for tag in &cell.nodes {
            write!(out, " {}", index[tag])?;
        }
        writeln!(out)?;
    }

    writeln!(out, "CELL_TYPES {}", cells.len())?;
    for cell in cells {
        writeln!(out, "{}", vtk_cell_type(cell.element_type))?;
    }

    writeln!(out, "CELL_DATA {}", cells.len())?;
    writeln!(out, "SCALARS group int 1")?;
    writeln!(out, "LOOKUP_TABLE default")?;
    for cell in cells {
        writeln!(out, "{}", cell.group)?;
    }
    Ok(())
}

/// ASCII STL of the triangle cells.
pub fn write_stl(
    out: &mut dyn Write,
    coords: &BTreeMap<NodeTag, DVec3>,
    cells: &[Cell],
) -> io::Result<()> {
    writeln!(out, "solid packmesh")?;
    for cell in cells.iter().filter(|c| c.element_type == ElementType::Triangle) {
        let [a, b, c] =
            [0, 1, 2].map(|i| coords.get(&cell.nodes[i]).copied().unwrap_or(DVec3::ZERO));
        let normal = (b - a).cross(c - a).normalize_or_zero();
        writeln!(out, "  facet normal {} {} {}", normal.x, normal.y, normal.z)?;
        writeln!(out, "    outer loop")?;
        for p in [a, b, c] {
            writeln!(out, "      vertex {} {} {}", p.x, p.y, p.z)?;
        }
        writeln!(out, "    endloop")?;
        writeln!(out, "  endfacet")?;
    }
    writeln!(out, "endsolid packmesh")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (BTreeMap<NodeTag, DVec3>, Vec<Cell>) {
        let coords = BTreeMap::from([
            (10, DVec3::ZERO),
            (11, DVec3::X),
            (12, DVec3::Y),
        ]);
        let cells = vec![Cell {
            element_type: ElementType::Triangle,
            nodes: vec![10, 11, 12],
            group: 3,
        }];
        (coords, cells)
    }

    #[test]
    fn test_vtk_layout() {
        let (coords, cells) = triangle();
        let mut buf = Vec::new();
        write_vtk(&mut buf, &coords, &cells).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("POINTS 3 double"));
        assert!(text.contains("CELLS 1 4\n3 0 1 2\n"));
        assert!(text.contains("CELL_TYPES 1\n5\n"));
        assert!(text.ends_with("LOOKUP_TABLE default\n3\n"));
    }

    #[test]
    fn test_stl_normal() {
        let (coords, cells) = triangle();
        let mut buf = Vec::new();
        write_stl(&mut buf, &coords, &cells).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("facet normal 0 0 1"));
        assert_eq!(text.matches("vertex").count(), 3);
    }

    #[test]
    fn test_unknown_extension() {
        let (coords, cells) = triangle();
        let err = write_mesh(Path::new("mesh.msh"), &coords, &cells).unwrap_err();
        assert!(matches!(err, KernelError::Unsupported(_)));
    }
}

use config::{PackedBedConfig, PackingFileConfig, PackingFormat, RefRadius};
use kernel_api::{GeometryKernel, TagOffsets};
use packed_bed::{read_packing, write_packing, Bead, PackedBed};
use preview_kernel::PreviewKernel;

fn packing(dir: &tempfile::TempDir, format: PackingFormat) -> PackedBedConfig {
    let path = dir.path().join("packing.xyzd");
    let records: Vec<[f64; 4]> = (0..10)
        .map(|i| [(i % 3) as f64 * 2.0, (i / 3) as f64 * 2.0, i as f64, 1.5])
        .collect();
    write_packing(&path, &records, format).unwrap();
    PackedBedConfig {
        packing_file: PackingFileConfig {
            filename: path,
            dataformat: Some(format),
        },
        ..Default::default()
    }
}

#[test]
fn count_limited_bed_from_big_endian_floats() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PackedBedConfig {
        nbeads: Some(4),
        zbot: Some(8.0),
        ..packing(&dir, PackingFormat::BigF32)
    };
    let bed = PackedBed::from_config(&cfg).unwrap();
    assert_eq!(bed.len(), 4);
    assert_eq!(bed.beads()[3], Bead::new(0.0, 2.0, 3.0, 0.75));
}

#[test]
fn z_filtered_bed_is_scaled_after_selection() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PackedBedConfig {
        zbot: Some(4.0),
        ztop: Some(8.0),
        scaling_factor: 2.0,
        ..packing(&dir, PackingFormat::LittleF64)
    };
    let bed = PackedBed::from_config(&cfg).unwrap();
    let zs: Vec<f64> = bed.beads().iter().map(|b| b.z).collect();
    assert_eq!(zs, vec![4.0, 6.0, 8.0]);
    assert_eq!(bed.beads()[0].r, 1.5);
}

#[test]
fn used_beads_dump_rereads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PackedBedConfig {
        auto_translate: true,
        ..packing(&dir, PackingFormat::LittleF32)
    };
    let bed = PackedBed::from_config(&cfg).unwrap();

    let dump = dir.path().join("beads_used.xyzd");
    bed.write(&dump, PackingFormat::LittleF64).unwrap();
    let reread: Vec<Bead> = read_packing(&dump, PackingFormat::LittleF64)
        .unwrap()
        .iter()
        .map(|r| Bead::from_record(r, 1.0, 1.0))
        .collect();
    assert_eq!(reread, bed.beads());
}

#[test]
fn copied_bed_meshes_every_bead() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PackedBedConfig {
        nbeads: Some(6),
        ..packing(&dir, PackingFormat::LittleF32)
    };
    let mut bed = PackedBed::from_config(&cfg).unwrap();
    let mut kernel = PreviewKernel::new();
    let offsets = bed
        .copy_reference_mesh(&mut kernel, TagOffsets::default(), 2, RefRadius::Avg)
        .unwrap();

    assert_eq!(kernel.entities(2).len(), 6);
    for shell in bed.shells() {
        assert!(!kernel.elements(shell[0]).unwrap().is_empty());
    }
    assert_eq!(offsets.node, kernel.max_node_tag());
}

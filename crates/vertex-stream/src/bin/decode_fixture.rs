//! Decode a draw described by a JSON fixture and print its mesh tables.
//!
//! Run: `cargo run -p vertex-stream --features test-tools --bin decode_fixture -- <fixture.json>`
//!
//! The fixture describes one draw the way a replay tool would report it:
//! `event_id`, `instances`, the vertex shader `outputs`, one `post_vs`
//! object (shared by every instance), and `buffers` mapping resource ids
//! to byte arrays. See `fixtures/triangle.json`.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use vertex_stream::decode::{OutputAttribute, ShaderVarType};
use vertex_stream::{
    DEFAULT_DELIMITER, DrawEvent, Exporter, MemorySource, PostVsData, ResourceId,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let fixture_path = env::args().nth(1).map_or_else(
        || Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/triangle.json"),
        PathBuf::from,
    );

    let fixture = read_json(&fixture_path)?;
    let (event, source) = parse_fixture(&fixture)?;

    let exporter = Exporter::new(source);
    let tables = exporter.export_draw(&event)?;

    let mut out = std::io::stdout().lock();
    for table in &tables {
        writeln!(out, "# {}", table.file_stem())?;
        table.write_delimited(&mut out, DEFAULT_DELIMITER)?;
    }

    Ok(())
}

fn parse_fixture(fixture: &Value) -> Result<(DrawEvent, MemorySource), String> {
    let event_id = read_u32(fixture, "event_id")?;
    let instances = read_u32(fixture, "instances").unwrap_or(1);

    let outputs = fixture["outputs"]
        .as_array()
        .ok_or("missing outputs")?
        .iter()
        .enumerate()
        .map(|(i, output)| parse_output(output).map_err(|e| format!("outputs[{i}]: {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    let post_vs = parse_post_vs(&fixture["post_vs"]).map_err(|e| format!("post_vs: {e}"))?;

    let mut source = MemorySource::new().with_signature(event_id, outputs);
    for instance in 0..instances {
        source = source.with_post_vs(event_id, instance, post_vs);
    }

    let buffers = fixture["buffers"].as_object().ok_or("missing buffers")?;
    for (id, bytes) in buffers {
        let id: u64 = id
            .parse()
            .map_err(|e| format!("buffers: invalid resource id {id}: {e}"))?;
        let bytes = bytes
            .as_array()
            .ok_or(format!("buffers[{id}]: expected an array of bytes"))?
            .iter()
            .map(|b| {
                b.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or(format!("buffers[{id}]: invalid byte {b}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        source = source.with_buffer(ResourceId(id), bytes);
    }

    Ok((DrawEvent::new(event_id, instances), source))
}

fn parse_output(output: &Value) -> Result<OutputAttribute, String> {
    let var_type = output["type"].as_str().ok_or("missing type")?;
    let component_count = output["components"]
        .as_u64()
        .and_then(|c| u8::try_from(c).ok())
        .ok_or("missing components")?;

    Ok(OutputAttribute {
        var_name: output["name"].as_str().unwrap_or_default().to_string(),
        semantic_name: output["semantic"].as_str().unwrap_or_default().to_string(),
        var_type: parse_var_type(var_type)?,
        component_count,
        is_position: output["position"].as_bool().unwrap_or(false),
    })
}

fn parse_var_type(name: &str) -> Result<ShaderVarType, String> {
    Ok(match name {
        "Float" => ShaderVarType::Float,
        "Double" => ShaderVarType::Double,
        "Half" => ShaderVarType::Half,
        "SInt" => ShaderVarType::SInt,
        "UInt" => ShaderVarType::UInt,
        "SShort" => ShaderVarType::SShort,
        "UShort" => ShaderVarType::UShort,
        "SLong" => ShaderVarType::SLong,
        "ULong" => ShaderVarType::ULong,
        "SByte" => ShaderVarType::SByte,
        "UByte" => ShaderVarType::UByte,
        "Bool" => ShaderVarType::Bool,
        _ => return Err(format!("unknown variable type {name}")),
    })
}

fn parse_post_vs(post_vs: &Value) -> Result<PostVsData, String> {
    let index_byte_stride = read_usize(post_vs, "index_byte_stride").unwrap_or(0);
    Ok(PostVsData {
        vertex_resource: ResourceId(read_u64(post_vs, "vertex_resource")?),
        vertex_byte_offset: read_usize(post_vs, "vertex_byte_offset").unwrap_or(0),
        vertex_byte_stride: read_usize(post_vs, "vertex_byte_stride")?,
        index_resource: ResourceId(read_u64(post_vs, "index_resource").unwrap_or(0)),
        index_byte_offset: read_usize(post_vs, "index_byte_offset").unwrap_or(0),
        index_byte_stride: u8::try_from(index_byte_stride)
            .map_err(|_| format!("index_byte_stride too large: {index_byte_stride}"))?,
        index_count: read_usize(post_vs, "index_count")?,
        base_vertex: post_vs["base_vertex"].as_i64().unwrap_or(0),
    })
}

fn read_u64(value: &Value, key: &str) -> Result<u64, String> {
    value[key].as_u64().ok_or(format!("missing {key}"))
}

fn read_u32(value: &Value, key: &str) -> Result<u32, String> {
    let v = read_u64(value, key)?;
    u32::try_from(v).map_err(|_| format!("{key} out of range: {v}"))
}

fn read_usize(value: &Value, key: &str) -> Result<usize, String> {
    let v = read_u64(value, key)?;
    usize::try_from(v).map_err(|_| format!("{key} out of range: {v}"))
}

fn read_json(path: &Path) -> Result<Value, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

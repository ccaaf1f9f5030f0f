use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let proto_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("..")
    .join("..")
    .join("proto");
  let csi_proto_file = proto_dir.join("csi.proto");

  println!("cargo:rerun-if-changed={}", csi_proto_file.display());

  tonic_build::configure()
    .build_client(true)
    .build_server(false)
    .compile(&[csi_proto_file], &[proto_dir])?;

  Ok(())
}

use std::io::Result;

fn main() -> Result<()> {
  let proto_file = "proto/datakeeper/v1/datakeeper.proto";

  tonic_build::configure().compile_protos(&[proto_file], &["proto"])?;

  println!("cargo:rerun-if-changed={}", proto_file);

  Ok(())
}

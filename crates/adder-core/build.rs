/// Builds the gRPC client and server code for `calculator.proto` using
/// `tonic-prost-build`.
///
/// # Codec
///
/// The generated client and server use [`ProtoCodec`] from this crate instead
/// of the stock prost codec. The only difference is how undecodable payloads
/// are reported: the stock codec answers `INTERNAL`, while a payload the
/// server cannot decode is the caller's fault and is answered with
/// `INVALID_ARGUMENT`.
///
/// # Files and Paths
///
/// - Proto file: `proto/calculator.proto`
/// - Includes: `proto/`
/// - Descriptor set: `$OUT_DIR/calculator_descriptor.bin` (served through gRPC
///   reflection)
///
/// # Output
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("calculator");
/// }
/// ```
///
/// [`ProtoCodec`]: crate::common::codec::ProtoCodec
use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=proto/calculator.proto");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let descriptor_path = out_dir.join("calculator_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .codec_path("crate::common::codec::ProtoCodec")
        .compile_with_config(config, &["proto/calculator.proto"], &["proto"])
        .expect("failed to compile calculator.proto");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the proto file via `prost`, generating service stubs
    // and proto definitions for use with `tonic`.
    // `protoc` is not available in every build environment, so the
    // descriptor set is pre-serialized next to the .proto file.
    tonic_build::configure()
        .file_descriptor_set_path("../protos/coordinator.fds")
        .skip_protoc_run()
        .compile(&["../protos/coordinator.proto"], &["../protos"])?;
    Ok(())
}

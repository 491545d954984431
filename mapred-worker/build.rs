fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The worker only needs the client half, but the generated module
    // carries both stubs; the unused server side is compiled out.
    // `protoc` is not available in every build environment, so the
    // descriptor set is pre-serialized next to the .proto file.
    tonic_build::configure()
        .file_descriptor_set_path("../protos/coordinator.fds")
        .skip_protoc_run()
        .compile(&["../protos/coordinator.proto"], &["../protos"])?;
    Ok(())
}

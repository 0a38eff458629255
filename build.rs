fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "server")]
    tonic_build::compile_protos("proto/or_solver.proto")?;
    Ok(())
}

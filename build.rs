fn main() {
    // Exposes GIT_COMMIT_HASH and package metadata through `built_info`.
    if let Err(err) = built::write_built_file() {
        panic!("Failed to acquire build-time information: {err}");
    }
}

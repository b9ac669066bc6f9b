use ort::execution_providers::ExecutionProviderDispatch;

/// Hardware backends the landmark session should try before CPU.
///
/// ONNX Runtime silently falls back to CPU when a provider fails to
/// register, so an empty list is always safe.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_most_one_accelerator_is_requested() {
        let providers = preferred_execution_providers();
        assert!(providers.len() <= 1);
        if cfg!(not(any(target_os = "macos", target_os = "windows"))) {
            assert!(providers.is_empty());
        }
    }
}

//! Registry trait for self-registering implementations.

/// Base trait for implementation registries.
///
/// Each pluggable implementation (block sources, for example) provides a
/// `Registry` struct declaring the name used for it in configuration files
/// and the factory that builds it.
pub trait ImplementationRegistry {
	/// Name of the implementation table, e.g. `"jsonrpc"` for
	/// `[countdown.implementations.jsonrpc]`.
	const NAME: &'static str;

	/// Factory function type of the component this implementation belongs to.
	type Factory;

	/// Returns the factory function for this implementation.
	fn factory() -> Self::Factory;
}

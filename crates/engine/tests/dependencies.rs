//! Unloadable marking, clearing and hook installation.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{fixture, qualified};
use constload_engine::{
	AutoloadError, BindingStore, CallbackError, InvalidTarget, Reference, Scope, Value, before_remove_fn,
};
use pretty_assertions::assert_eq;

#[test]
fn missing_dependency_raises_source_not_found() {
	let fx = fixture(&[]);
	let names_before = fx.deps.store().names();

	let err = fx.deps.require_dependency("missing_service").unwrap_err();
	match err {
		AutoloadError::SourceNotFound { name, searched } => {
			assert_eq!(name, "missing_service");
			assert!(searched.contains(&fx.app()));
		}
		other => panic!("expected SourceNotFound, got {other:?}"),
	}
	assert_eq!(fx.deps.store().names(), names_before);
	assert!(fx.deps.loaded_files().is_empty());
}

#[test]
fn unloadable_is_repeatable() {
	let fx = fixture(&[]);
	let store = fx.deps.store();

	for _ in 0..2 {
		let m = Value::namespace();
		store.bind(qualified("M"), m.clone());
		assert!(m.unloadable(&fx.deps).unwrap());

		fx.deps.clear().unwrap();
		assert!(!fx.is_bound("M"), "clear should unload unloadable constants each time");
		assert!(fx.deps.unloadable().is_empty());
	}
}

#[test]
fn unloadable_fails_with_anonymous_values() {
	let fx = fixture(&[]);
	let m = Value::namespace();

	let err = m.unloadable(&fx.deps).unwrap_err();
	assert!(matches!(err, AutoloadError::InvalidTarget(InvalidTarget::Anonymous)));
	assert!(fx.deps.unloadable().is_empty());
}

#[test]
fn unloadable_returns_change_flag() {
	let fx = fixture(&[]);
	let m = Value::namespace();
	fx.deps.store().bind(qualified("M"), m.clone());

	assert!(m.unloadable(&fx.deps).unwrap());
	assert!(!m.unloadable(&fx.deps).unwrap());
	assert_eq!(fx.deps.unloadable().len(), 1);

	fx.deps.store().unbind(&qualified("M"));
}

#[test]
fn unloadable_constants_receive_callback() {
	let fx = fixture(&[]);
	let calls = Arc::new(AtomicUsize::new(0));
	let saw_binding = Arc::new(AtomicUsize::new(0));

	let (calls_in, saw_in) = (calls.clone(), saw_binding.clone());
	let c = Value::with_before_remove(
		(),
		before_remove_fn(move |value: &Value, store: &BindingStore| {
			calls_in.fetch_add(1, Ordering::SeqCst);
			if value.name().is_some_and(|n| store.lookup(n).is_some_and(|bound| bound.ptr_eq(value))) {
				saw_in.fetch_add(1, Ordering::SeqCst);
			}
			Ok::<(), CallbackError>(())
		}),
	);
	fx.deps.store().bind(qualified("C"), c.clone());
	c.unloadable(&fx.deps).unwrap();
	assert!(c.before_remove_hook().is_some());

	fx.deps.clear().unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(saw_binding.load(Ordering::SeqCst), 1);
	assert!(!fx.is_bound("C"));
}

#[test]
fn nested_unloadable_constants_receive_callback() {
	let fx = fixture(&[]);
	let calls = Arc::new(AtomicUsize::new(0));

	let calls_in = calls.clone();
	let users = Value::with_before_remove(
		(),
		before_remove_fn(move |_: &Value, _: &BindingStore| {
			calls_in.fetch_add(1, Ordering::SeqCst);
			Ok::<(), CallbackError>(())
		}),
	);
	fx.deps.store().bind(qualified("Admin"), Value::namespace());
	fx.deps.store().bind(qualified("Admin::Users"), users);
	fx.deps.mark_unloadable("Admin").unwrap();
	fx.deps.mark_unloadable("Admin::Users").unwrap();

	let report = fx.deps.clear().unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(report.removed, vec![qualified("Admin"), qualified("Admin::Users")]);
	assert!(report.skipped.is_empty());
	assert!(fx.deps.store().is_empty());
}

#[test]
fn hook_called_multiple_times() {
	let fx = fixture(&[]);
	assert!(fx.deps.hook());
	assert!(!fx.deps.hook());

	let scope = Scope::root();
	match fx.deps.reference(&scope, "Nowhere").unwrap() {
		Reference::Missing(name) => assert_eq!(name, "Nowhere"),
		other => panic!("expected Missing, got {other:?}"),
	}
	assert_eq!(scope.missing_count(), 1);
}

#[test]
fn scope_with_missing_counts_every_miss() {
	let fx = fixture(&[]);
	let module_with_missing = Scope::new(qualified("ModuleWithMissing")).intercepting();

	for expected in 1..=3 {
		let reference = fx.deps.reference(&module_with_missing, "NonExistent").unwrap();
		assert!(matches!(reference, Reference::Missing(ref n) if n == "NonExistent"));
		assert_eq!(module_with_missing.missing_count(), expected);
	}
}

#[test]
fn clear_empties_registry_regardless_of_size() {
	let fx = fixture(&[]);
	for i in 0..16 {
		let name = format!("Const{i}");
		fx.deps.store().bind(qualified(&name), Value::new(i));
		fx.deps.mark_unloadable(&name).unwrap();
	}
	assert_eq!(fx.deps.unloadable().len(), 16);

	let report = fx.deps.clear().unwrap();
	assert_eq!(report.removed.len(), 16);
	assert!(fx.deps.unloadable().is_empty());
	assert!(fx.deps.store().is_empty());
}

//! Concurrency tests for proxy type synthesis
//!
//! Many threads asking for the same proxy type at once must observe exactly
//! one build, and all of them must receive the same type.

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use common::{init_test_logging, test_model};
use surrogate_engine::{ProxyConfig, ProxyFactory, TypeRef, Value};

const THREADS: usize = 16;

// ============================================================================
// Shared factory
// ============================================================================

mod shared_factory {
    use super::*;

    #[test]
    fn test_concurrent_first_use_builds_once() {
        init_test_logging();
        let factory = Arc::new(ProxyFactory::new(ProxyConfig::default()));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let factory = factory.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let (instance, _) = test_model();
                    barrier.wait();
                    let proxy = factory.create_proxy(&instance).unwrap();
                    assert_eq!(proxy.call("Run4", vec![]).unwrap(), Value::Int(4));
                    proxy.proxy_type().clone()
                })
            })
            .collect();

        let types: Vec<TypeRef> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(factory.registry().build_count(), 1);
        assert!(types.iter().all(|t| Arc::ptr_eq(t, &types[0])));
    }

    #[test]
    fn test_concurrent_calls_through_one_proxy() {
        init_test_logging();
        let factory = ProxyFactory::new(ProxyConfig::default());
        let (instance, payload) = test_model();
        let proxy = Arc::new(factory.create_proxy(&instance).unwrap());

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let proxy = proxy.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        proxy.call("Run1", vec![]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(payload.run1_calls(), THREADS * 10);
    }
}

// ============================================================================
// Separate factories
// ============================================================================

mod separate_factories {
    use super::*;

    #[test]
    fn test_factories_do_not_share_types() {
        let a = ProxyFactory::new(ProxyConfig::default());
        let b = ProxyFactory::new(ProxyConfig::default());
        let (instance, _) = test_model();

        let pa = a.create_proxy(&instance).unwrap();
        let pb = b.create_proxy(&instance).unwrap();

        assert_eq!(pa.proxy_type().full_name(), pb.proxy_type().full_name());
        assert!(!Arc::ptr_eq(pa.proxy_type(), pb.proxy_type()));
    }

    #[test]
    fn test_shared_registry() {
        let first = ProxyFactory::default();
        let second = ProxyFactory::with_registry(ProxyConfig::default(), first.registry().clone());
        let (instance, _) = test_model();

        first.create_proxy(&instance).unwrap();
        second.create_proxy(&instance).unwrap();

        assert_eq!(first.registry().build_count(), 1);
    }
}

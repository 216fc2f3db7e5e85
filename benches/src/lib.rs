//! # IVC Benchmarks
//!
//! Fixtures shared by the criterion benches: chains of cubic instances with
//! a few elliptic-curve operations each.
//!
//! ```bash
//! cargo bench --bench ivc
//! ```

pub use client_ivc;
pub use commitments;
pub use ivc_core;

use client_ivc::{ClientIvc, IvcConfig};
use group::Group;
use ivc_core::shapes::{cubic_assignment, StandardShape};
use ivc_core::{DefaultGroup, DefaultScalar, EcOp, FoldingResult, Instance, VerificationKey};

/// Verification key of the cubic shape under the default commitment key
pub fn cubic_key() -> FoldingResult<VerificationKey<DefaultGroup>> {
    StandardShape::Cubic.verification_key()
}

/// `count` satisfying cubic instances, each logging one multiply-add-check
/// sequence
pub fn cubic_instances(
    vk: &VerificationKey<DefaultGroup>,
    count: usize,
) -> FoldingResult<Vec<Instance<DefaultGroup>>> {
    (0..count as u64)
        .map(|i| {
            let x = DefaultScalar::from(i + 2);
            let (witness, public) = cubic_assignment(x);
            let p = DefaultGroup::generator() * x;
            let ops = vec![
                EcOp::Mul(p, x),
                EcOp::Add(p),
                EcOp::EqAndReset(p * x + p),
            ];
            Instance::new(vk.shape.clone(), public, witness, ops, &vk.ck)
        })
        .collect()
}

/// Accumulates every instance into a fresh chain
pub fn accumulate_all(
    config: IvcConfig,
    vk: &VerificationKey<DefaultGroup>,
    instances: &[Instance<DefaultGroup>],
) -> FoldingResult<ClientIvc<DefaultGroup>> {
    let mut ivc = ClientIvc::new(config);
    for instance in instances {
        ivc.accumulate(instance, vk)?;
    }
    Ok(ivc)
}

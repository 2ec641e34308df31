//! Application layer containing the callback orchestration.
//!
//! `Button` is the entry point the host framework drives. It wires the
//! decorators in this module to the ports defined in `domain::ports`: the
//! generic `CallbackDecorator`, the `PaymentTokenBroker` and the
//! `ActionRewriter`. It shares the process-wide `MetaBridge` with every
//! other button.

pub mod actions;
pub mod button;
pub mod decorator;
pub mod eligibility;
pub mod listener;
pub mod meta;
pub mod payment;

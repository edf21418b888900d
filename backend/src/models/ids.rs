//! Identifier newtypes shared across the engine.

crate::define_id_type!(i64, ScenarioId);
crate::define_id_type!(i64, AreaId);
crate::define_id_type!(i64, InterventionId);
crate::define_id_type!(i64, BudgetId);

// Tenant (organisation) key used to resolve the configured impact provider.
crate::define_id_type!(String, TenantId);

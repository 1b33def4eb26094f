use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::attributes::{AttributeDefinition, AttributeType};
use crate::auth::{IdentityContext, TenantMembershipGuard};
use crate::types::TenantId;

use super::{WorkflowResult, Workflows};

/// One tenant attribute with its schema and current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedAttribute {
    pub display_name: String,
    pub attribute_type: AttributeType,
    /// `null` when the tenant has no truthy value for the attribute.
    pub value: Value,
}

/// Attribute name to projected attribute.
pub type TenantAttributeProjection = BTreeMap<String, ProjectedAttribute>;

/// Join a schema with a tenant's stored values.
///
/// Every defined attribute appears exactly once. Stored values that are
/// absent or falsy (`null`, `false`, `0`, `""`) project as `null`; values
/// with no definition are dropped.
pub fn project(
    definitions: &[AttributeDefinition],
    values: &serde_json::Map<String, Value>,
) -> TenantAttributeProjection {
    definitions
        .iter()
        .map(|definition| {
            let value = values
                .get(&definition.attribute_name)
                .filter(|v| is_truthy(v))
                .cloned()
                .unwrap_or(Value::Null);

            (
                definition.attribute_name.clone(),
                ProjectedAttribute {
                    display_name: definition.display_name.clone(),
                    attribute_type: definition.attribute_type.clone(),
                    value,
                },
            )
        })
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl Workflows {
    /// Current attribute values of one of the caller's tenants, keyed by
    /// attribute name.
    pub async fn project_tenant_attributes(
        &self,
        context: &IdentityContext,
        tenant_id: &TenantId,
    ) -> WorkflowResult<TenantAttributeProjection> {
        TenantMembershipGuard::authorize(context, tenant_id)?;

        let definitions = self.identity.list_tenant_attributes().await?;
        let tenant = self.identity.get_tenant(tenant_id).await?;

        Ok(project(&definitions, &tenant.attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::GuardDenial;
    use crate::identity::testing::FakeIdentity;
    use crate::workflows::WorkflowError;
    use crate::workflows::testing::{caller, harness};
    use serde_json::json;

    fn schema() -> Vec<AttributeDefinition> {
        vec![
            AttributeDefinition::new("seats", "Seats", AttributeType::Number),
            AttributeDefinition::new("region", "Region", AttributeType::String),
            AttributeDefinition::new("trial", "Trial", AttributeType::Bool),
        ]
    }

    #[test]
    fn test_falsy_and_absent_values_project_as_null() {
        let values = json!({"seats": 0, "trial": false, "unknown": "x"});
        let projection = project(&schema(), values.as_object().unwrap());

        assert_eq!(projection.len(), 3);
        assert_eq!(projection["seats"].value, Value::Null);
        assert_eq!(projection["region"].value, Value::Null);
        assert_eq!(projection["trial"].value, Value::Null);
        assert!(!projection.contains_key("unknown"));
    }

    #[test]
    fn test_serialized_shape() {
        let values = json!({"seats": 12, "region": "eu"});
        let projection = project(&schema()[..2], values.as_object().unwrap());

        assert_eq!(
            serde_json::to_value(&projection).unwrap(),
            json!({
                "seats": {"display_name": "Seats", "attribute_type": "number", "value": 12},
                "region": {"display_name": "Region", "attribute_type": "string", "value": "eu"}
            })
        );
    }

    #[tokio::test]
    async fn test_projection_reads_schema_then_tenant() {
        let h = harness(
            FakeIdentity::new()
                .with_tenant_attributes(schema())
                .with_tenant_values(json!({"seats": 5})),
        )
        .await;

        let projection = h
            .workflows
            .project_tenant_attributes(&caller(&["t1"]), &TenantId::new("t1"))
            .await
            .unwrap();

        assert_eq!(projection["seats"].value, json!(5));
        assert_eq!(
            h.identity.call_names(),
            vec!["list_tenant_attributes", "get_tenant"]
        );
    }

    #[tokio::test]
    async fn test_projection_is_guarded() {
        let h = harness(FakeIdentity::new()).await;
        let err = h
            .workflows
            .project_tenant_attributes(&caller(&[]), &TenantId::new("t1"))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Authorization(GuardDenial::NoTenants)));
        assert!(h.identity.calls().is_empty());
    }
}

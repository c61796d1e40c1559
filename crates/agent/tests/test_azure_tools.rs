//! Built-in Azure tools against a mocked management endpoint

use mockito::{Matcher, Server};
use sreagent_agent::tools::auth::{CheckEndpointAuthTool, VerifyRbacPermissionsTool};
use sreagent_agent::tools::availability::GetContainerAppStatusTool;
use sreagent_agent::tools::database::{UpdateDatabaseTierTool, UpdateFirewallRuleTool};
use sreagent_agent::tools::network::{CheckNsgRulesTool, NsgRuleTool, RemoveNsgRuleTool};
use sreagent_agent::tools::performance::CheckAppServiceMetricsTool;
use sreagent_agent::tools::ArmClient;
use sreagent_agent::ToolTrait;
use std::sync::Arc;

const NSG_PATH: &str =
    "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Network/networkSecurityGroups/app-nsg";

fn arm(server: &Server) -> Arc<ArmClient> {
    Arc::new(ArmClient::new(
        server.url(),
        Some("sub-1".to_string()),
        Some("arm-token".to_string()),
    ))
}

fn api_version(version: &str) -> Matcher {
    Matcher::UrlEncoded("api-version".into(), version.into())
}

#[tokio::test]
async fn test_check_nsg_rules_lists_rules_by_priority() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", NSG_PATH)
        .match_query(api_version("2023-09-01"))
        .match_header("authorization", "Bearer arm-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "name": "app-nsg",
                "properties": {
                    "securityRules": [
                        {"name": "deny-sql", "properties": {"priority": 300, "direction": "Inbound", "access": "Deny", "protocol": "Tcp", "destinationPortRange": "1433", "sourceAddressPrefix": "*", "destinationAddressPrefix": "*"}},
                        {"name": "allow-https", "properties": {"priority": 100, "direction": "Inbound", "access": "Allow", "protocol": "Tcp", "destinationPortRange": "443", "sourceAddressPrefix": "*", "destinationAddressPrefix": "*"}}
                    ],
                    "defaultSecurityRules": []
                }
            }"#,
        )
        .create_async()
        .await;

    let tool = CheckNsgRulesTool::new(arm(&server));
    let out = tool.execute("rg app-nsg").await.unwrap();

    let https = out.find("allow-https").unwrap();
    let sql = out.find("deny-sql").unwrap();
    assert!(https < sql);
    assert!(out.contains("deny-sql [priority 300] Inbound Deny Tcp port 1433"));
    assert!(out.contains("Default rules (0):"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_check_nsg_rules_missing_nsg() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", NSG_PATH)
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let out = CheckNsgRulesTool::new(arm(&server))
        .execute("rg app-nsg")
        .await
        .unwrap();
    assert_eq!(out, "NSG 'app-nsg' not found in resource group 'rg'");
}

#[tokio::test]
async fn test_check_nsg_rules_api_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", NSG_PATH)
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(r#"{"error": {"code": "AuthorizationFailed", "message": "no read access"}}"#)
        .create_async()
        .await;

    let err = CheckNsgRulesTool::new(arm(&server))
        .execute("rg app-nsg")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Azure returned 403: no read access");
}

#[tokio::test]
async fn test_create_nsg_rule_puts_rule() {
    let mut server = Server::new_async().await;
    let rule_path = format!("{}/securityRules/allow-sql", NSG_PATH);
    server
        .mock("GET", rule_path.as_str())
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;
    let put = server
        .mock("PUT", rule_path.as_str())
        .match_query(api_version("2023-09-01"))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "properties": {
                "access": "Allow",
                "protocol": "Tcp",
                "direction": "Inbound",
                "priority": 200,
                "destinationPortRange": "1433"
            }
        })))
        .with_status(201)
        .with_body(
            r#"{"name": "allow-sql", "properties": {"priority": 200, "direction": "Inbound", "access": "Allow", "protocol": "Tcp", "destinationPortRange": "1433"}}"#,
        )
        .create_async()
        .await;

    let out = NsgRuleTool::create(arm(&server))
        .execute("rg app-nsg allow-sql allow tcp 1433 200")
        .await
        .unwrap();

    assert!(out.starts_with("Created rule allow-sql [priority 200] Inbound Allow Tcp port 1433"));
    put.assert_async().await;
}

#[tokio::test]
async fn test_create_nsg_rule_refuses_existing_rule() {
    let mut server = Server::new_async().await;
    let rule_path = format!("{}/securityRules/allow-sql", NSG_PATH);
    server
        .mock("GET", rule_path.as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"name": "allow-sql", "properties": {"priority": 200}}"#)
        .create_async()
        .await;

    let err = NsgRuleTool::create(arm(&server))
        .execute("rg app-nsg allow-sql allow tcp 1433")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "rule 'allow-sql' already exists on app-nsg, use UpdateNsgRule"
    );
}

#[tokio::test]
async fn test_update_nsg_rule_keeps_existing_priority() {
    let mut server = Server::new_async().await;
    let rule_path = format!("{}/securityRules/web", NSG_PATH);
    server
        .mock("GET", rule_path.as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"name": "web", "properties": {"priority": 150, "access": "Deny"}}"#)
        .create_async()
        .await;
    let put = server
        .mock("PUT", rule_path.as_str())
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(serde_json::json!({
            "properties": { "priority": 150, "access": "Allow", "destinationPortRange": "443" }
        })))
        .with_status(200)
        .with_body(r#"{"name": "web", "properties": {"priority": 150, "access": "Allow"}}"#)
        .create_async()
        .await;

    let out = NsgRuleTool::update(arm(&server))
        .execute("rg app-nsg web allow tcp 443")
        .await
        .unwrap();

    assert!(out.starts_with("Updated rule web [priority 150]"));
    put.assert_async().await;
}

#[tokio::test]
async fn test_update_nsg_rule_requires_existing_rule() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Any)
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let err = NsgRuleTool::update(arm(&server))
        .execute("rg app-nsg web allow tcp 443")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "rule 'web' not found on app-nsg");
}

#[tokio::test]
async fn test_remove_nsg_rule() {
    let mut server = Server::new_async().await;
    let rule_path = format!("{}/securityRules/old-rule", NSG_PATH);
    server
        .mock("DELETE", rule_path.as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .create_async()
        .await;

    let out = RemoveNsgRuleTool::new(arm(&server))
        .execute("rg app-nsg old-rule")
        .await
        .unwrap();
    assert_eq!(out, "Removed rule old-rule from app-nsg");
}

#[tokio::test]
async fn test_remove_missing_nsg_rule() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", Matcher::Any)
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let out = RemoveNsgRuleTool::new(arm(&server))
        .execute("rg app-nsg ghost")
        .await
        .unwrap();
    assert_eq!(out, "Rule ghost does not exist on app-nsg");
}

#[tokio::test]
async fn test_update_firewall_rule() {
    let mut server = Server::new_async().await;
    let put = server
        .mock(
            "PUT",
            "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Sql/servers/sqlsrv/firewallRules/office",
        )
        .match_query(api_version("2021-11-01"))
        .match_body(Matcher::Json(serde_json::json!({
            "properties": { "startIpAddress": "203.0.113.1", "endIpAddress": "203.0.113.9" }
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let out = UpdateFirewallRuleTool::new(arm(&server))
        .execute("rg sqlsrv office 203.0.113.1 203.0.113.9")
        .await
        .unwrap();

    assert_eq!(
        out,
        "Firewall rule office on sqlsrv now allows 203.0.113.1 - 203.0.113.9"
    );
    put.assert_async().await;
}

#[tokio::test]
async fn test_update_database_tier() {
    let mut server = Server::new_async().await;
    let patch = server
        .mock(
            "PATCH",
            "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Sql/servers/sqlsrv/databases/orders",
        )
        .match_query(api_version("2021-11-01"))
        .match_body(Matcher::Json(serde_json::json!({ "sku": { "name": "S3" } })))
        .with_status(202)
        .with_body(r#"{"properties": {"status": "Scaling"}}"#)
        .create_async()
        .await;

    let out = UpdateDatabaseTierTool::new(arm(&server))
        .execute("rg sqlsrv orders S3")
        .await
        .unwrap();

    assert_eq!(
        out,
        "Requested tier S3 for database orders on sqlsrv (status: Scaling)"
    );
    patch.assert_async().await;
}

#[tokio::test]
async fn test_verify_rbac_permissions() {
    let mut server = Server::new_async().await;
    server
        .mock(
            "GET",
            "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Authorization/roleAssignments",
        )
        .match_query(Matcher::AllOf(vec![
            api_version("2022-04-01"),
            Matcher::UrlEncoded("$filter".into(), "atScope()".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"value": [{"properties": {
                "principalId": "1111",
                "principalType": "ServicePrincipal",
                "roleDefinitionId": "/subscriptions/sub-1/providers/Microsoft.Authorization/roleDefinitions/acdd72a7"
            }}]}"#,
        )
        .create_async()
        .await;

    let out = VerifyRbacPermissionsTool::new(arm(&server))
        .execute("resourceGroups/rg")
        .await
        .unwrap();

    assert_eq!(
        out,
        "1 role assignments at resourceGroups/rg:\n  ServicePrincipal 1111 -> role acdd72a7"
    );
}

#[tokio::test]
async fn test_check_endpoint_auth_reports_challenge() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/orders")
        .with_status(401)
        .with_header("www-authenticate", "Bearer realm=\"api\"")
        .create_async()
        .await;

    let tool = CheckEndpointAuthTool::new(reqwest::Client::new());
    let out = tool
        .execute(&format!("{}/api/orders", server.url()))
        .await
        .unwrap();

    assert!(out.contains("answered 401 Unauthorized"));
    assert!(out.contains("WWW-Authenticate: Bearer realm=\"api\""));
    assert!(out.contains("requires authentication"));
}

#[tokio::test]
async fn test_container_app_status_flags_unready_revision() {
    let mut server = Server::new_async().await;
    server
        .mock(
            "GET",
            "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.App/containerApps/web",
        )
        .match_query(api_version("2023-05-01"))
        .with_status(200)
        .with_body(
            r#"{"properties": {
                "provisioningState": "Succeeded",
                "runningStatus": "Running",
                "latestRevisionName": "web--v2",
                "latestReadyRevisionName": "web--v1",
                "template": {"scale": {"minReplicas": 1, "maxReplicas": 5}}
            }}"#,
        )
        .create_async()
        .await;

    let out = GetContainerAppStatusTool::new(arm(&server))
        .execute("rg web")
        .await
        .unwrap();

    assert!(out.contains("latest revision: web--v2"));
    assert!(out.contains("scale: min 1 / max 5 replicas"));
    assert!(out.contains("the latest revision is not ready"));
}

#[tokio::test]
async fn test_app_service_metrics_summary() {
    let mut server = Server::new_async().await;
    server
        .mock(
            "GET",
            "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Web/sites/shop/providers/Microsoft.Insights/metrics",
        )
        .match_query(Matcher::AllOf(vec![
            api_version("2018-01-01"),
            Matcher::UrlEncoded("timespan".into(), "PT30M".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"value": [{
                "name": {"value": "MemoryWorkingSet", "localizedValue": "Memory working set"},
                "unit": "Bytes",
                "timeseries": [{"data": [{"average": 100.0}, {"average": 300.0}]}]
            }]}"#,
        )
        .create_async()
        .await;

    let out = CheckAppServiceMetricsTool::new(arm(&server))
        .execute("rg shop")
        .await
        .unwrap();

    assert_eq!(
        out,
        "App Service shop:\nMemory working set: avg 200.0, max 300.0 Bytes over 2 points"
    );
}

#[tokio::test]
async fn test_tools_need_subscription() {
    let arm = Arc::new(ArmClient::new("http://127.0.0.1:1", None, Some("t".to_string())));
    let err = CheckNsgRulesTool::new(arm)
        .execute("rg app-nsg")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Azure subscription id is not configured");
}

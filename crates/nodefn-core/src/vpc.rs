//! VPC placement for a function.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes for VPC validation.
pub mod codes {
    pub const VPC_REQUIRED: &str = "VPC_REQUIRED";
    pub const VPC_SUBNETS_EMPTY: &str = "VPC_SUBNETS_EMPTY";
    pub const VPC_PUBLIC_SUBNET: &str = "VPC_PUBLIC_SUBNET";
}

/// Subnet routing kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubnetKind {
    #[default]
    Private,
    Public,
    Isolated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub kind: SubnetKind,
}

/// VPC settings as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcConfig {
    #[serde(default)]
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
    #[serde(default)]
    pub allow_public_subnet: bool,
}

/// Validated placement handed on to deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcAttachment {
    pub vpc_id: String,
    pub subnet_ids: Vec<String>,
    pub security_groups: Vec<String>,
    /// Set when no security group was given and one must be created.
    pub generated_security_group: Option<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VpcError {
    #[error("Cannot configure '{what}' without configuring a VPC")]
    VpcRequired { what: &'static str },

    #[error("VPC {vpc_id} has no subnets selected for the function")]
    SubnetsEmpty { vpc_id: String },

    #[error(
        "Lambda Functions in a public subnet can NOT access the internet (subnet {subnet_id}). \
         If you are aware of this limitation and would still like to place the function in a \
         public subnet, set `allowPublicSubnet` to true"
    )]
    PublicSubnet { subnet_id: String },
}

impl VpcError {
    /// Get the stable error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::VpcRequired { .. } => codes::VPC_REQUIRED,
            Self::SubnetsEmpty { .. } => codes::VPC_SUBNETS_EMPTY,
            Self::PublicSubnet { .. } => codes::VPC_PUBLIC_SUBNET,
        }
    }
}

/// Validate VPC settings for the construct `construct_id`.
///
/// Returns `Ok(None)` when the function is not placed in a VPC.
///
/// # Errors
/// Returns an error if subnets or security groups are given without a VPC,
/// a VPC has no subnets, or a public subnet is used without opting in.
pub fn attach(construct_id: &str, config: &VpcConfig) -> Result<Option<VpcAttachment>, VpcError> {
    let Some(vpc_id) = &config.vpc_id else {
        if !config.security_group_ids.is_empty() {
            return Err(VpcError::VpcRequired {
                what: "securityGroups",
            });
        }
        if !config.subnets.is_empty() {
            return Err(VpcError::VpcRequired { what: "vpcSubnets" });
        }
        return Ok(None);
    };

    if config.subnets.is_empty() {
        return Err(VpcError::SubnetsEmpty {
            vpc_id: vpc_id.clone(),
        });
    }

    if !config.allow_public_subnet {
        if let Some(public) = config.subnets.iter().find(|s| s.kind == SubnetKind::Public) {
            return Err(VpcError::PublicSubnet {
                subnet_id: public.id.clone(),
            });
        }
    }

    let generated_security_group = config
        .security_group_ids
        .is_empty()
        .then(|| format!("{construct_id}SecurityGroup"));

    Ok(Some(VpcAttachment {
        vpc_id: vpc_id.clone(),
        subnet_ids: config.subnets.iter().map(|s| s.id.clone()).collect(),
        security_groups: config.security_group_ids.clone(),
        generated_security_group,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(id: &str, kind: SubnetKind) -> Subnet {
        Subnet {
            id: id.to_string(),
            kind,
        }
    }

    #[test]
    fn test_no_vpc() {
        assert_eq!(attach("Fn", &VpcConfig::default()).unwrap(), None);
    }

    #[test]
    fn test_private_subnets_with_generated_security_group() {
        let config = VpcConfig {
            vpc_id: Some("vpc-1".to_string()),
            subnets: vec![
                subnet("subnet-a", SubnetKind::Private),
                subnet("subnet-b", SubnetKind::Private),
            ],
            ..Default::default()
        };

        let attachment = attach("Fn", &config).unwrap().unwrap();
        assert_eq!(attachment.vpc_id, "vpc-1");
        assert_eq!(attachment.subnet_ids, vec!["subnet-a", "subnet-b"]);
        assert!(attachment.security_groups.is_empty());
        assert_eq!(
            attachment.generated_security_group.as_deref(),
            Some("FnSecurityGroup")
        );
    }

    #[test]
    fn test_explicit_security_groups() {
        let config = VpcConfig {
            vpc_id: Some("vpc-1".to_string()),
            subnets: vec![subnet("subnet-a", SubnetKind::Isolated)],
            security_group_ids: vec!["sg-1".to_string()],
            allow_public_subnet: false,
        };

        let attachment = attach("Fn", &config).unwrap().unwrap();
        assert_eq!(attachment.security_groups, vec!["sg-1"]);
        assert_eq!(attachment.generated_security_group, None);
    }

    #[test]
    fn test_security_groups_without_vpc() {
        let config = VpcConfig {
            security_group_ids: vec!["sg-1".to_string()],
            ..Default::default()
        };
        let err = attach("Fn", &config).unwrap_err();
        assert_eq!(err.code(), codes::VPC_REQUIRED);
        assert!(err.to_string().contains("securityGroups"));
    }

    #[test]
    fn test_subnets_without_vpc() {
        let config = VpcConfig {
            subnets: vec![subnet("subnet-a", SubnetKind::Private)],
            ..Default::default()
        };
        assert_eq!(attach("Fn", &config).unwrap_err().code(), codes::VPC_REQUIRED);
    }

    #[test]
    fn test_vpc_without_subnets() {
        let config = VpcConfig {
            vpc_id: Some("vpc-1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            attach("Fn", &config).unwrap_err().code(),
            codes::VPC_SUBNETS_EMPTY
        );
    }

    #[test]
    fn test_public_subnet_needs_opt_in() {
        let mut config = VpcConfig {
            vpc_id: Some("vpc-1".to_string()),
            subnets: vec![subnet("subnet-pub", SubnetKind::Public)],
            ..Default::default()
        };
        let err = attach("Fn", &config).unwrap_err();
        assert_eq!(err.code(), codes::VPC_PUBLIC_SUBNET);
        assert!(err.to_string().contains("allowPublicSubnet"));

        config.allow_public_subnet = true;
        assert!(attach("Fn", &config).unwrap().is_some());
    }

    #[test]
    fn test_vpc_config_from_json() {
        let config: VpcConfig = serde_json::from_str(
            r#"{"vpcId":"vpc-9","subnets":[{"id":"s-1"},{"id":"s-2","kind":"isolated"}]}"#,
        )
        .unwrap();
        assert_eq!(config.subnets[0].kind, SubnetKind::Private);
        assert_eq!(config.subnets[1].kind, SubnetKind::Isolated);
    }
}

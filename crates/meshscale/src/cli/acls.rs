//! the `acls` subcommand - manage access-control policies

use clap::{Args, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use meshscale_acl::{Acl, AclId, AclPolicyTag, AclPolicyType, TrafficDirection, sort_by_name};
use meshscale_types::{NetworkId, User};

use super::ConfigArgs;

/// manage acls
#[derive(Subcommand, Debug)]
pub enum AclsCommand {
    /// create a new acl
    Create(CreateAclArgs),

    /// list acls of a network
    List(ListAclsArgs),

    /// show one acl
    Get(GetAclArgs),

    /// update an acl
    Update(UpdateAclArgs),

    /// delete an acl
    Delete(DeleteAclArgs),
}

/// rule type as given on the command line
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RuleTypeArg {
    /// device to device
    Device,
    /// users and groups to devices
    User,
}

impl From<RuleTypeArg> for AclPolicyType {
    fn from(arg: RuleTypeArg) -> Self {
        match arg {
            RuleTypeArg::Device => AclPolicyType::DevicePolicy,
            RuleTypeArg::User => AclPolicyType::UserPolicy,
        }
    }
}

/// traffic direction as given on the command line
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DirectionArg {
    /// src may reach dst
    Uni,
    /// src and dst may reach each other
    Bi,
}

impl From<DirectionArg> for TrafficDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Uni => TrafficDirection::Unidirectional,
            DirectionArg::Bi => TrafficDirection::Bidirectional,
        }
    }
}

/// create a new acl
#[derive(Args, Debug)]
pub struct CreateAclArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// network the acl belongs to
    #[arg(long)]
    network: NetworkId,

    /// acl name
    #[arg(long)]
    name: String,

    /// rule type
    #[arg(long = "type", value_enum)]
    rule_type: RuleTypeArg,

    /// sources as kind:value (e.g. device:web, user-group:*)
    #[arg(long, value_delimiter = ',')]
    src: Vec<AclPolicyTag>,

    /// destinations as kind:value
    #[arg(long, value_delimiter = ',')]
    dst: Vec<AclPolicyTag>,

    /// allowed traffic direction
    #[arg(long, value_enum, default_value = "uni")]
    direction: DirectionArg,

    /// create the acl disabled
    #[arg(long, default_value_t = false)]
    disabled: bool,

    /// creator recorded on the acl
    #[arg(long, env = "USER", default_value = "admin")]
    created_by: String,
}

/// list acls
#[derive(Args, Debug)]
pub struct ListAclsArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// network to list
    #[arg(long)]
    network: NetworkId,

    /// only acls of this rule type
    #[arg(long = "type", value_enum)]
    rule_type: Option<RuleTypeArg>,

    /// only user acls whose src covers this user
    #[arg(long, conflicts_with = "rule_type")]
    user: Option<String>,

    /// output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,
}

/// show one acl
#[derive(Args, Debug)]
pub struct GetAclArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// acl id
    id: AclId,

    /// output format (table, json)
    #[arg(short, long, default_value = "json")]
    output: String,
}

/// update an acl
#[derive(Args, Debug)]
pub struct UpdateAclArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// acl id
    id: AclId,

    /// new name
    #[arg(long)]
    name: Option<String>,

    /// replace the sources (pass no value to clear)
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    src: Option<Vec<AclPolicyTag>>,

    /// replace the destinations (pass no value to clear)
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    dst: Option<Vec<AclPolicyTag>>,

    /// new allowed direction
    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,

    /// enable or disable the acl
    #[arg(long)]
    enabled: Option<bool>,
}

/// delete an acl
#[derive(Args, Debug)]
pub struct DeleteAclArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// acl id
    id: AclId,
}

impl AclsCommand {
    /// run the acls command
    pub async fn run(self) -> Result<()> {
        match self {
            AclsCommand::Create(args) => create_acl(args).await,
            AclsCommand::List(args) => list_acls(args).await,
            AclsCommand::Get(args) => get_acl(args).await,
            AclsCommand::Update(args) => update_acl(args).await,
            AclsCommand::Delete(args) => delete_acl(args).await,
        }
    }
}

async fn create_acl(args: CreateAclArgs) -> Result<()> {
    let engine = args.config.connect().await?;

    let acl = Acl::new(args.network, args.name, args.rule_type.into())
        .with_src(args.src)
        .with_dst(args.dst)
        .with_direction(args.direction.into())
        .with_enabled(!args.disabled)
        .with_creator(args.created_by);

    let created = engine.create(acl).await.context("failed to create acl")?;

    println!("Created acl:");
    print_details(&created);
    Ok(())
}

async fn list_acls(args: ListAclsArgs) -> Result<()> {
    let engine = args.config.connect().await?;

    let mut acls = match (args.user, args.rule_type) {
        (Some(username), _) => {
            engine
                .list_policies_for_user_in_network(&User::new(username), &args.network)
                .await
        }
        (None, Some(RuleTypeArg::Device)) => engine.list_device_policies(&args.network).await,
        (None, Some(RuleTypeArg::User)) => {
            engine.list_user_policies_by_network(&args.network).await
        }
        (None, None) => engine.list(&args.network).await,
    }
    .context("failed to list acls")?;
    sort_by_name(&mut acls);

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&acls)?);
        return Ok(());
    }

    if acls.is_empty() {
        println!("No acls found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<20} {:<14} {:<8} {:<8} {:<4} {:<24} {:<24}",
        "ID", "NAME", "TYPE", "DEFAULT", "ENABLED", "DIR", "SRC", "DST"
    );
    println!("{}", "-".repeat(145));

    for acl in acls {
        println!(
            "{:<36} {:<20} {:<14} {:<8} {:<8} {:<4} {:<24} {:<24}",
            acl.id,
            acl.name,
            acl.rule_type,
            acl.default,
            acl.enabled,
            direction_label(acl.allowed_direction),
            join_tags(&acl.src),
            join_tags(&acl.dst),
        );
    }

    Ok(())
}

async fn get_acl(args: GetAclArgs) -> Result<()> {
    let engine = args.config.connect().await?;

    let acl = engine
        .get(&args.id)
        .await
        .with_context(|| format!("failed to get acl {}", args.id))?;

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&acl)?);
    } else {
        print_details(&acl);
    }
    Ok(())
}

async fn update_acl(args: UpdateAclArgs) -> Result<()> {
    let engine = args.config.connect().await?;

    let existing = engine
        .get(&args.id)
        .await
        .with_context(|| format!("failed to get acl {}", args.id))?;

    let mut incoming = existing.clone();
    incoming.name = args.name.unwrap_or_default();
    if let Some(src) = args.src {
        incoming.src = src;
    }
    if let Some(dst) = args.dst {
        incoming.dst = dst;
    }
    if let Some(direction) = args.direction {
        incoming.allowed_direction = direction.into();
    }
    if let Some(enabled) = args.enabled {
        incoming.enabled = enabled;
    }

    engine
        .validate(&existing.merged_with(&incoming))
        .context("updated acl is invalid")?;
    let updated = engine
        .update(&incoming, &existing)
        .await
        .with_context(|| format!("failed to update acl {}", args.id))?;

    println!("Updated acl:");
    print_details(&updated);
    Ok(())
}

async fn delete_acl(args: DeleteAclArgs) -> Result<()> {
    let engine = args.config.connect().await?;

    engine
        .delete(&args.id)
        .await
        .with_context(|| format!("failed to delete acl {}", args.id))?;

    println!("Deleted acl {}", args.id);
    Ok(())
}

fn print_details(acl: &Acl) {
    println!("  ID:         {}", acl.id);
    println!("  Name:       {}", acl.name);
    println!("  Network:    {}", acl.network_id);
    println!("  Type:       {}", acl.rule_type);
    println!("  Default:    {}", acl.default);
    println!("  Enabled:    {}", acl.enabled);
    println!("  Direction:  {}", direction_label(acl.allowed_direction));
    println!("  Src:        {}", join_tags(&acl.src));
    println!("  Dst:        {}", join_tags(&acl.dst));
    println!("  Created by: {}", acl.created_by);
    println!("  Created at: {}", acl.created_at.to_rfc3339());
}

fn direction_label(direction: TrafficDirection) -> &'static str {
    match direction {
        TrafficDirection::Unidirectional => "uni",
        TrafficDirection::Bidirectional => "bi",
    }
}

fn join_tags(tags: &[AclPolicyTag]) -> String {
    if tags.is_empty() {
        return "-".to_string();
    }
    tags.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use meshscale_acl::AclTagKind;

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "meshscale",
            "acls",
            "create",
            "--network",
            "skynet",
            "--name",
            "web",
            "--type",
            "device",
            "--src",
            "device:tagA,device:tagB",
            "--dst",
            "device:*",
            "--direction",
            "bi",
        ])
        .unwrap();

        let Command::Acls(AclsCommand::Create(args)) = cli.command else {
            panic!("expected acls create");
        };
        assert_eq!(args.network.as_str(), "skynet");
        assert_eq!(
            args.src,
            vec![AclPolicyTag::device("tagA"), AclPolicyTag::device("tagB")]
        );
        assert_eq!(args.dst, vec![AclPolicyTag::wildcard(AclTagKind::Device)]);
        assert!(matches!(args.direction, DirectionArg::Bi));
        assert!(!args.disabled);
    }

    #[test]
    fn test_parse_update_clears_src() {
        let id = AclId::generate();
        let cli = Cli::try_parse_from([
            "meshscale",
            "acls",
            "update",
            &id.to_string(),
            "--src",
            "--enabled",
            "false",
        ])
        .unwrap();

        let Command::Acls(AclsCommand::Update(args)) = cli.command else {
            panic!("expected acls update");
        };
        assert_eq!(args.id, id);
        assert_eq!(args.src, Some(vec![]));
        assert_eq!(args.dst, None);
        assert_eq!(args.enabled, Some(false));
    }

    #[test]
    fn test_parse_rejects_bad_tag() {
        let result = Cli::try_parse_from([
            "meshscale",
            "acls",
            "create",
            "--network",
            "skynet",
            "--name",
            "web",
            "--type",
            "device",
            "--src",
            "printer:tagA",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_join_tags() {
        assert_eq!(join_tags(&[]), "-");
        assert_eq!(
            join_tags(&[AclPolicyTag::user("alice"), AclPolicyTag::user_group("*")]),
            "user:alice,user-group:*"
        );
    }
}

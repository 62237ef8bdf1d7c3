//! The `env` group: shows the environment variables the client reads

use crate::cli::{CommandGroup, CommandTable, GroupUsage, Outcome};

/// Group with no commands whose help lists the supported variables
pub struct Env;

impl CommandGroup for Env {
    type Globals = ();

    fn name(&self) -> &str {
        "env"
    }

    fn about(&self) -> Option<&str> {
        Some("Display available environment options")
    }

    fn register(_table: &mut CommandTable<Self>) {}

    fn help(&self, _usage: &GroupUsage) -> Outcome {
        let user = std::env::var("USER").unwrap_or_default();
        print!("{}", env_help(&user));
        Outcome::Status(0)
    }
}

/// Example exports for every variable the client reads
pub fn env_help(user: &str) -> String {
    format!(
        "# Available environment variables\n\
         export OS_TENANT_NAME='{user}'\n\
         export LUNR_ADMIN='admin'\n\
         export LUNR_TENANT_ID='admin'\n\
         export LUNR_STORAGE_URL='http://localhost:8081'\n\
         export LUNR_API_URL='http://localhost:8080'\n\
         export LUNR_TIMEOUT='30'\n\
         \n\
         # Used by Auth to fetch a TENANT_NAME's DDI\n\
         export OS_USERNAME='demo'\n\
         export OS_PASSWORD='devstack'\n\
         export OS_AUTH_URL='http://localhost:5000/v2.0'\n\
         \n\
         # Optional settings file and log filter\n\
         export LUNR_CONFIG='~/.config/lunrclient/lunr.yml'\n\
         export LUNR_LOG='lunrclient=debug'\n"
    )
}

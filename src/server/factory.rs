use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use openssl::ssl::{SslAcceptor, SslAcceptorBuilder, SslMethod};

use crate::server::authn::factory::AuthnFactory;
use crate::server::authn::token::factory::TokenFactory;
use crate::server::authz::factory::AuthzFactory;
use crate::server::db::factory::DbFactory;
use crate::server::handlers::api::ApiHandler;
use crate::server::handlers::healthz::HealthzHandler;
use crate::server::handlers::login::LoginHandler;
use crate::server::handlers::register::RegisterHandler;
use crate::time::current_timestamp;
use crate::types::user::{generate_password_hash, GlobalRank};

use super::config::ServerConfig;
use super::db::{Database, UserRecord};
use super::restful::{RestfulContext, RestfulServer};

pub struct ServerFactory {
    db: Arc<Database>,
    cfg: ServerConfig,
}

impl ServerFactory {
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let db_factory = DbFactory::new();
        let db = db_factory.build_db(&cfg.db).context("init database")?;
        let factory = Self { cfg, db };
        factory.bootstrap_admin().context("bootstrap admin")?;
        Ok(factory)
    }

    /// Creates the configured admin account, or resets its password and
    /// rank when it already exists.
    fn bootstrap_admin(&self) -> Result<()> {
        let name = &self.cfg.authn.admin_name;
        let password = &self.cfg.authn.admin_password;
        if password.is_empty() {
            info!("Admin password is empty, skip bootstrapping admin '{name}'");
            return Ok(());
        }
        if password == "admin" {
            warn!("Using default admin password IS DANGEROUS, please change it in production");
        }

        let (hash, salt) = generate_password_hash(password);
        let now = current_timestamp();
        self.db.with_transaction(|tx| {
            match tx.get_user_by_name(name)? {
                Some(user) => {
                    tx.update_user_password(&user.id, &hash, &salt, now)?;
                    if !user.rank.is_global_admin() {
                        tx.update_user_rank(&user.id, GlobalRank::Admin, now)?;
                    }
                    info!("Update admin '{name}'");
                }
                None => {
                    tx.create_user(&UserRecord {
                        id: uuid::Uuid::new_v4().to_string(),
                        name: name.clone(),
                        rank: GlobalRank::Admin,
                        hash: hash.clone(),
                        salt: salt.clone(),
                        create_time: now,
                        update_time: now,
                        last_active: 0,
                    })?;
                    info!("Create admin '{name}'");
                }
            }
            Ok(())
        })
    }

    pub fn build_server(&self) -> Result<RestfulServer> {
        let ssl = self.build_ssl()?;
        let ctx = self.build_context()?;

        let mut srv =
            RestfulServer::new(self.cfg.bind.clone(), ssl, ctx, self.cfg.payload_limit_mib);
        if self.cfg.keep_alive_secs > 0 {
            srv.set_keep_alive_secs(self.cfg.keep_alive_secs);
        }
        if self.cfg.workers > 0 {
            srv.set_workers(self.cfg.workers);
        }

        Ok(srv)
    }

    pub fn build_ssl(&self) -> Result<Option<SslAcceptorBuilder>> {
        if !self.cfg.ssl {
            return Ok(None);
        }

        let mut builder =
            SslAcceptor::mozilla_intermediate(SslMethod::tls()).context("init ssl acceptor")?;

        builder
            .set_private_key_file(&self.cfg.key_path, openssl::ssl::SslFiletype::PEM)
            .context("load ssl key file")?;
        builder
            .set_certificate_chain_file(&self.cfg.cert_path)
            .context("load ssl cert file")?;

        Ok(Some(builder))
    }

    pub fn build_context(&self) -> Result<Arc<RestfulContext>> {
        let token_factory = TokenFactory::new(&self.cfg.authn.token).context("init token")?;

        let authn_factory = AuthnFactory::new();
        let authn = authn_factory
            .build_authenticator(&self.cfg.authn, &token_factory, self.db.clone())
            .context("init authenticator")?;

        let authz_factory = AuthzFactory::new();
        let authz = authz_factory.build_authorizer();

        let api_handler = ApiHandler::new(authn, authz, self.db.clone());
        let healthz_handler = HealthzHandler::new(self.db.clone());

        let token_generator = token_factory
            .build_token_generator()
            .context("init token generator")?;
        let token_generator = Arc::new(token_generator);

        let login_handler = LoginHandler::new(
            self.cfg.authn.admin_allow_list.clone(),
            token_generator.clone(),
            self.db.clone(),
        );
        let register_handler = RegisterHandler::new(
            self.cfg.authn.allow_registration,
            self.cfg.authn.allow_guests,
            token_generator,
            self.db.clone(),
        );

        Ok(Arc::new(RestfulContext {
            api_handler,
            healthz_handler,
            login_handler,
            register_handler,
        }))
    }
}

// PPP endpoints
//
// `/ppp/secret` (access-control records) and `/ppp/active` (live sessions).
// Reads filter by account name with `?name=` and trim the reply with
// `.proplist`; writes always target a resolved `.id`.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{PppActive, PppSecret, from_record};
use crate::protocol::Command;

pub const SECRET_PATH: &str = "/ppp/secret";
pub const ACTIVE_PATH: &str = "/ppp/active";

impl<S> ApiClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// List PPP secrets whose `name` equals `name`, returning only `fields`.
    ///
    /// `/ppp/secret/print =.proplist=... ?name=...`
    pub async fn find_secrets(
        &mut self,
        name: &str,
        fields: &[&str],
    ) -> Result<Vec<PppSecret>, Error> {
        debug!(name, "querying PPP secrets");
        let cmd = Command::new(format!("{SECRET_PATH}/print"))
            .proplist(fields)
            .query("name", name);
        self.execute(cmd)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    /// Set the `disabled` flag on one secret.
    ///
    /// `/ppp/secret/set =.id=... =disabled=yes|no`
    pub async fn set_secret_disabled(&mut self, id: &str, disabled: bool) -> Result<(), Error> {
        debug!(id, disabled, "updating PPP secret");
        let cmd = Command::new(format!("{SECRET_PATH}/set"))
            .attr(".id", id)
            .attr("disabled", if disabled { "yes" } else { "no" });
        self.execute(cmd).await?;
        Ok(())
    }

    /// List live PPP sessions for `name`, returning only `fields`.
    ///
    /// `/ppp/active/print =.proplist=... ?name=...`
    pub async fn find_active(
        &mut self,
        name: &str,
        fields: &[&str],
    ) -> Result<Vec<PppActive>, Error> {
        debug!(name, "querying active PPP sessions");
        let cmd = Command::new(format!("{ACTIVE_PATH}/print"))
            .proplist(fields)
            .query("name", name);
        self.execute(cmd)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    /// Drop one live PPP session.
    ///
    /// `/ppp/active/remove =.id=...`
    pub async fn remove_active(&mut self, id: &str) -> Result<(), Error> {
        debug!(id, "removing active PPP session");
        let cmd = Command::new(format!("{ACTIVE_PATH}/remove")).attr(".id", id);
        self.execute(cmd).await?;
        Ok(())
    }
}

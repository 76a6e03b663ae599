use std::net::SocketAddr;

use async_std::net::TcpStream;

use crate::Error;

use super::state::{Connecting, Sending};
use super::Call;

impl Call<Connecting> {
    /// The resolved address.
    pub fn address(&self) -> SocketAddr {
        self.state.address
    }

    /// Proceed to the next state.
    ///
    /// Opens a new connection, there is no retry.
    pub async fn proceed(self) -> Result<Call<Sending>, Error> {
        let address = self.state.address;

        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| Error::Connect(format!("{}: {}", address, e)))?;

        Ok(Call::wrap(self.inner, Sending { address, stream }))
    }
}

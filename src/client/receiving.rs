use async_std::io::ReadExt;

use crate::Error;

use super::state::{Decoding, Receiving};
use super::Call;

impl Call<Receiving> {
    /// Proceed to the next state.
    ///
    /// Reads until the server closes the connection. The request was sent with
    /// `connection: close`, the end of the stream is the end of the response.
    pub async fn proceed(self) -> Result<Call<Decoding>, Error> {
        let Receiving { mut stream } = self.state;
        let mut buffer = Vec::new();

        let max = self.inner.config.get_max_response_size();

        match max {
            Some(max) => {
                // One byte over the max tells us the server had more to send.
                let limit = (max as u64).saturating_add(1);
                (&mut stream)
                    .take(limit)
                    .read_to_end(&mut buffer)
                    .await
                    .map_err(|e| Error::Recv(e.to_string()))?;

                if buffer.len() > max {
                    return Err(Error::ResponseTooLarge(max));
                }
            }
            None => {
                stream
                    .read_to_end(&mut buffer)
                    .await
                    .map_err(|e| Error::Recv(e.to_string()))?;
            }
        }

        debug!("Received {} bytes", buffer.len());

        // The connection closes here.
        drop(stream);

        Ok(Call::wrap(self.inner, Decoding { buffer }))
    }
}

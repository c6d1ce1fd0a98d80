pub mod channel_list;
pub mod provider;
pub mod traits;

pub use channel_list::{decode_channel_list, extract_fragment, parse_channel_list};
pub use provider::ProviderClient;
pub use traits::ChannelProvider;

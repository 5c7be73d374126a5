//! Known networks.
//!
//! Ownership claims prefer a "home" network (Story mainnet or testnet). The
//! registry asks the wallet to switch to the home network once before
//! attempting an on-chain claim.

/// A chain the wallet may be connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    pub key: &'static str,
    pub chain_id: u64,
    pub name: &'static str,
    pub rpc_url: &'static str,
}

pub const STORY: Network = Network {
    key: "story",
    chain_id: 1337,
    name: "Story Protocol",
    rpc_url: "https://rpc.story.foundation",
};

pub const STORY_TESTNET: Network = Network {
    key: "story-testnet",
    chain_id: 1338,
    name: "Story Testnet",
    rpc_url: "https://testnet-rpc.story.foundation",
};

pub const ETHEREUM: Network = Network {
    key: "ethereum",
    chain_id: 1,
    name: "Ethereum Mainnet",
    rpc_url: "https://eth.llamarpc.com",
};

pub const SEPOLIA: Network = Network {
    key: "sepolia",
    chain_id: 11_155_111,
    name: "Sepolia Testnet",
    rpc_url: "https://rpc.sepolia.org",
};

pub const POLYGON: Network = Network {
    key: "polygon",
    chain_id: 137,
    name: "Polygon Mainnet",
    rpc_url: "https://polygon-rpc.com",
};

pub const MUMBAI: Network = Network {
    key: "mumbai",
    chain_id: 80_001,
    name: "Mumbai Testnet",
    rpc_url: "https://rpc-mumbai.maticvigil.com",
};

pub const NETWORKS: [Network; 6] = [STORY, STORY_TESTNET, ETHEREUM, SEPOLIA, POLYGON, MUMBAI];

pub fn by_chain_id(chain_id: u64) -> Option<&'static Network> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

pub fn by_key(key: &str) -> Option<&'static Network> {
    NETWORKS.iter().find(|n| n.key == key)
}

/// Whether `chain_id` is one of the home networks.
pub fn is_home_network(chain_id: u64) -> bool {
    chain_id == STORY.chain_id || chain_id == STORY_TESTNET.chain_id
}

/// Network the registry switches to before claiming.
pub fn home_network(use_testnet: bool) -> &'static Network {
    if use_testnet {
        &NETWORKS[1]
    } else {
        &NETWORKS[0]
    }
}

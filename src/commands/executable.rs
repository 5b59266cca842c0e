use crate::frame::Frame;
use crate::persistence::Rdb;
use crate::server::Stats;
use crate::store::Store;
use crate::Error;

/// Everything a command may touch, injected where the connection handler is
/// built. A command sees exactly what it is handed; there is no ambient
/// state.
#[derive(Clone)]
pub struct Context {
    pub store: Store,
    pub rdb: Rdb,
    pub stats: Stats,
}

pub trait Executable {
    fn exec(self, ctx: Context) -> Result<Frame, Error>;
}

#[cfg(test)]
impl Context {
    pub(crate) fn test() -> Context {
        let path = std::env::temp_dir().join(format!("memdis-test-{}.rdb", uuid::Uuid::new_v4()));
        Context {
            store: Store::new(),
            rdb: Rdb::new(path),
            stats: Stats::new(),
        }
    }
}

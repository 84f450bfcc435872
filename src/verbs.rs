//! Verb Table
//!
//! Maps convenience method names (`get`, `hgetall`, ...) to wire verbs.
//! The client only depends on the [`VerbResolver`] capability; the static
//! table below is the default implementation.

use std::collections::HashMap;

/// Resolves a method name to the verb sent on the wire
pub trait VerbResolver {
    fn resolve(&self, name: &str) -> Option<&str>;
}

/// Built-in table of well-known commands, matched case-insensitively
#[derive(Debug, Clone, Copy, Default)]
pub struct VerbTable;

/// Sorted by name for binary search
static VERBS: &[(&str, &str)] = &[
    ("append", "APPEND"), ("auth", "AUTH"), ("bgrewriteaof", "BGREWRITEAOF"),
    ("bgsave", "BGSAVE"), ("bitcount", "BITCOUNT"), ("bitop", "BITOP"), ("bitpos", "BITPOS"),
    ("blpop", "BLPOP"), ("brpop", "BRPOP"), ("brpoplpush", "BRPOPLPUSH"), ("client", "CLIENT"),
    ("cluster", "CLUSTER"), ("command", "COMMAND"), ("config", "CONFIG"), ("dbsize", "DBSIZE"),
    ("debug", "DEBUG"), ("decr", "DECR"), ("decrby", "DECRBY"), ("del", "DEL"),
    ("discard", "DISCARD"), ("dump", "DUMP"), ("echo", "ECHO"), ("eval", "EVAL"),
    ("evalsha", "EVALSHA"), ("exec", "EXEC"), ("exists", "EXISTS"), ("expire", "EXPIRE"),
    ("expireat", "EXPIREAT"), ("flushall", "FLUSHALL"), ("flushdb", "FLUSHDB"),
    ("geoadd", "GEOADD"), ("geodist", "GEODIST"), ("geohash", "GEOHASH"), ("geopos", "GEOPOS"),
    ("georadius", "GEORADIUS"), ("georadiusbymember", "GEORADIUSBYMEMBER"), ("get", "GET"),
    ("getbit", "GETBIT"), ("getrange", "GETRANGE"), ("getset", "GETSET"), ("hdel", "HDEL"),
    ("hexists", "HEXISTS"), ("hget", "HGET"), ("hgetall", "HGETALL"), ("hincrby", "HINCRBY"),
    ("hincrbyfloat", "HINCRBYFLOAT"), ("hkeys", "HKEYS"), ("hlen", "HLEN"), ("hmget", "HMGET"),
    ("hmset", "HMSET"), ("hscan", "HSCAN"), ("hset", "HSET"), ("hsetnx", "HSETNX"),
    ("hstrlen", "HSTRLEN"), ("hvals", "HVALS"), ("incr", "INCR"), ("incrby", "INCRBY"),
    ("incrbyfloat", "INCRBYFLOAT"), ("info", "INFO"), ("keys", "KEYS"),
    ("lastsave", "LASTSAVE"), ("lindex", "LINDEX"), ("linsert", "LINSERT"), ("llen", "LLEN"),
    ("lpop", "LPOP"), ("lpush", "LPUSH"), ("lpushx", "LPUSHX"), ("lrange", "LRANGE"),
    ("lrem", "LREM"), ("lset", "LSET"), ("ltrim", "LTRIM"), ("mget", "MGET"),
    ("migrate", "MIGRATE"), ("monitor", "MONITOR"), ("move", "MOVE"), ("mset", "MSET"),
    ("msetnx", "MSETNX"), ("multi", "MULTI"), ("object", "OBJECT"), ("persist", "PERSIST"),
    ("pexpire", "PEXPIRE"), ("pexpireat", "PEXPIREAT"), ("pfadd", "PFADD"),
    ("pfcount", "PFCOUNT"), ("pfmerge", "PFMERGE"), ("ping", "PING"), ("psetex", "PSETEX"),
    ("psubscribe", "PSUBSCRIBE"), ("pttl", "PTTL"), ("publish", "PUBLISH"),
    ("pubsub", "PUBSUB"), ("punsubscribe", "PUNSUBSCRIBE"), ("quit", "QUIT"),
    ("randomkey", "RANDOMKEY"), ("rename", "RENAME"), ("renamenx", "RENAMENX"),
    ("restore", "RESTORE"), ("role", "ROLE"), ("rpop", "RPOP"), ("rpoplpush", "RPOPLPUSH"),
    ("rpush", "RPUSH"), ("rpushx", "RPUSHX"), ("sadd", "SADD"), ("save", "SAVE"),
    ("scan", "SCAN"), ("scard", "SCARD"), ("script", "SCRIPT"), ("sdiff", "SDIFF"),
    ("sdiffstore", "SDIFFSTORE"), ("select", "SELECT"), ("set", "SET"), ("setbit", "SETBIT"),
    ("setex", "SETEX"), ("setnx", "SETNX"), ("setrange", "SETRANGE"), ("shutdown", "SHUTDOWN"),
    ("sinter", "SINTER"), ("sinterstore", "SINTERSTORE"), ("sismember", "SISMEMBER"),
    ("slaveof", "SLAVEOF"), ("slowlog", "SLOWLOG"), ("smembers", "SMEMBERS"),
    ("smove", "SMOVE"), ("sort", "SORT"), ("spop", "SPOP"), ("srandmember", "SRANDMEMBER"),
    ("srem", "SREM"), ("sscan", "SSCAN"), ("strlen", "STRLEN"), ("subscribe", "SUBSCRIBE"),
    ("sunion", "SUNION"), ("sunionstore", "SUNIONSTORE"), ("sync", "SYNC"), ("time", "TIME"),
    ("ttl", "TTL"), ("type", "TYPE"), ("unsubscribe", "UNSUBSCRIBE"), ("unwatch", "UNWATCH"),
    ("wait", "WAIT"), ("watch", "WATCH"), ("zadd", "ZADD"), ("zcard", "ZCARD"),
    ("zcount", "ZCOUNT"), ("zincrby", "ZINCRBY"), ("zinterstore", "ZINTERSTORE"),
    ("zlexcount", "ZLEXCOUNT"), ("zrange", "ZRANGE"), ("zrangebylex", "ZRANGEBYLEX"),
    ("zrangebyscore", "ZRANGEBYSCORE"), ("zrank", "ZRANK"), ("zrem", "ZREM"),
    ("zremrangebylex", "ZREMRANGEBYLEX"), ("zremrangebyrank", "ZREMRANGEBYRANK"),
    ("zremrangebyscore", "ZREMRANGEBYSCORE"), ("zrevrange", "ZREVRANGE"),
    ("zrevrangebylex", "ZREVRANGEBYLEX"), ("zrevrangebyscore", "ZREVRANGEBYSCORE"),
    ("zrevrank", "ZREVRANK"), ("zscan", "ZSCAN"), ("zscore", "ZSCORE"),
    ("zunionstore", "ZUNIONSTORE"),
];

impl VerbTable {
    /// Number of known verbs
    pub fn len(&self) -> usize {
        VERBS.len()
    }

    pub fn is_empty(&self) -> bool {
        VERBS.is_empty()
    }

    /// All `(name, verb)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        VERBS.iter().copied()
    }
}

impl VerbResolver for VerbTable {
    fn resolve(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        VERBS
            .binary_search_by(|(known, _)| known.cmp(&name.as_str()))
            .ok()
            .map(|idx| VERBS[idx].1)
    }
}

/// Custom tables keyed by exact name
impl VerbResolver for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<R: VerbResolver + ?Sized> VerbResolver for &R {
    fn resolve(&self, name: &str) -> Option<&str> {
        (**self).resolve(name)
    }
}
